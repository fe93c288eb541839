use leptos::prelude::*;

use weatherguard_shared::{CityRecord, DatasetKey};

use crate::app::{ActiveScreen, Hovered, SIDEBAR_WIDTH, dispatch_marker_events};
use crate::colors::{rgb_css, rgba_css};

/// Branding, screen switcher and the city list for the active screen.
#[component]
pub fn Sidebar() -> impl IntoView {
    let ActiveScreen(screen) = expect_context();

    view! {
        <div
            style="height: 100%; background: #0f172a; display: flex; flex-direction: column;"
            style:width=format!("{SIDEBAR_WIDTH}px")
        >
            <SidebarHeader />
            <ScreenSwitcher />
            <div style="padding: 14px 20px 6px; font-size: 0.68rem; font-weight: 700; letter-spacing: 0.16em; color: #64748b;">
                {move || screen.get().dataset().list_heading}
            </div>
            <div class="scrollbar-thin" style="flex: 1; overflow-y: auto; padding: 0 10px 12px;">
                <CityList />
            </div>
        </div>
    }
}

#[component]
fn SidebarHeader() -> impl IntoView {
    let ActiveScreen(screen) = expect_context();

    view! {
        <div style="padding: 20px 20px 14px; border-bottom: 1px solid #1e293b;">
            <div style="font-size: 1.2rem; font-weight: 800; letter-spacing: 0.06em; color: #f8fafc;">
                {move || screen.get().dataset().title}
            </div>
            <div style="margin-top: 4px; font-size: 0.8rem; font-weight: 700; letter-spacing: 0.12em;">
                {move || screen.get().dataset().headline}
                " "
                <span style:color=move || rgb_css(screen.get().dataset().headline_accent_rgb)>
                    {move || screen.get().dataset().headline_accent}
                </span>
            </div>
            <div style="margin-top: 6px; display: flex; align-items: center; gap: 6px; font-size: 0.68rem; color: #34d399;">
                <span class="pulse-dot" style="width: 6px; height: 6px; border-radius: 50%; background: #34d399;" />
                {move || screen.get().dataset().status_line}
            </div>
        </div>
    }
}

#[component]
fn ScreenSwitcher() -> impl IntoView {
    let ActiveScreen(screen) = expect_context();

    view! {
        <div style="display: flex; gap: 6px; padding: 12px 20px 0;">
            {DatasetKey::ALL
                .into_iter()
                .enumerate()
                .map(|(i, key)| {
                    let active = move || screen.get() == key;
                    view! {
                        <button
                            title=format!("{} ({})", key.label(), i + 1)
                            style="flex: 1; padding: 6px 0; border-radius: 6px; font-size: 0.72rem; font-weight: 600; cursor: pointer; transition: background 0.15s, color 0.15s;"
                            style:background=move || if active() { "#1e293b" } else { "transparent" }
                            style:color=move || if active() { "#f8fafc" } else { "#64748b" }
                            style:border=move || if active() { "1px solid #334155" } else { "1px solid #1e293b" }
                            on:click=move |_| screen.set(key)
                        >
                            {key.label()}
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}

/// One row per city. Hovering a row drives the same selection as hovering its marker.
#[component]
fn CityList() -> impl IntoView {
    let ActiveScreen(screen) = expect_context();
    let Hovered(hovered) = expect_context();

    view! {
        <For
            each=move || {
                let key = screen.get();
                key.dataset()
                    .cities
                    .iter()
                    .map(|city| (key, city.clone()))
                    .collect::<Vec<_>>()
            }
            // Both screens number their cities from 1.
            key=|(screen_key, city): &(DatasetKey, CityRecord)| (*screen_key, city.id)
            children=move |(_, city): (DatasetKey, CityRecord)| {
                let id = city.id;
                let class = city.danger_class();
                let accent = class.accent_rgb();
                let is_active = move || hovered.with(|sel| sel.is_active(id));
                let on_enter = move |_| {
                    let cities = &screen.get_untracked().dataset().cities;
                    dispatch_marker_events(hovered, None, Some(id), cities);
                };
                let on_leave = move |_| {
                    let cities = &screen.get_untracked().dataset().cities;
                    dispatch_marker_events(hovered, Some(id), None, cities);
                };
                view! {
                    <div
                        style="display: flex; align-items: center; gap: 10px; padding: 8px 10px; border-radius: 6px; cursor: default; transition: background 0.15s;"
                        style:background=move || if is_active() { rgba_css(accent, 0.12) } else { "transparent".to_string() }
                        on:mouseenter=on_enter
                        on:mouseleave=on_leave
                    >
                        <div
                            style="width: 10px; height: 10px; border-radius: 50%; flex-shrink: 0;"
                            style:background=rgb_css(accent)
                        />
                        <div style="flex: 1; min-width: 0; font-size: 0.88rem; color: #e2e8f0; overflow: hidden; text-overflow: ellipsis; white-space: nowrap;">
                            {city.name.clone()}
                        </div>
                        <div
                            style="font-family: 'JetBrains Mono', monospace; font-size: 0.8rem; font-weight: 700;"
                            style:color=rgb_css(accent)
                        >
                            {format!("{}%", city.danger_score)}
                        </div>
                    </div>
                }
            }
        />
    }
}
