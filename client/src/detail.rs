use leptos::prelude::*;

use weatherguard_shared::{DetailView, HoverSelection};

use crate::app::{ActiveScreen, Hovered};
use crate::colors::{fade_gradient, rgb_css, rgba_css};
use crate::hit_test::HitIndex;
use crate::viewport::Viewport;

/// Gap between a marker's edge and the tooltip's bottom.
const TOOLTIP_GAP_PX: f64 = 6.0;

/// Card for the hovered city. Renders nothing while the selection is empty.
#[component]
pub fn DetailPanel() -> impl IntoView {
    let Hovered(hovered) = expect_context();
    let ActiveScreen(screen) = expect_context();

    let view_model = Memo::new(move |_| {
        let source_label = screen.get().dataset().source_label;
        hovered.with(|sel| DetailView::render(sel, source_label))
    });

    move || {
        let Some(detail) = view_model.get() else {
            return ().into_any();
        };
        let labels = screen.get_untracked().dataset().detail_labels;
        let accent = detail.class.accent_rgb();
        let badge = detail.class.badge_rgb();
        let bar_fill = fade_gradient(accent, 1.0, 0.55);

        view! {
            <div
                class="panel-reveal"
                style="position: absolute; right: 20px; bottom: 28px; z-index: 30; width: 280px; padding: 16px 18px; background: rgba(15,23,42,0.94); border: 1px solid #1e293b; border-radius: 12px; box-shadow: 0 10px 30px rgba(0,0,0,0.5); pointer-events: none;"
                style:border-top=format!("3px solid {}", rgb_css(accent))
            >
                {labels.heading.map(|heading| view! {
                    <div style="font-size: 0.62rem; letter-spacing: 0.16em; color: #64748b; margin-bottom: 6px;">{heading}</div>
                })}
                <div style="display: flex; align-items: center; justify-content: space-between; gap: 10px;">
                    <div style="font-size: 1.15rem; font-weight: 800; color: #f8fafc;">{detail.name.clone()}</div>
                    <span
                        style="font-size: 0.62rem; font-weight: 700; letter-spacing: 0.1em; padding: 2px 8px; border-radius: 999px;"
                        style:color=rgb_css(badge)
                        style:background=rgba_css(badge, 0.15)
                    >
                        {detail.status_label}
                    </span>
                </div>
                <div style="margin-top: 12px; display: flex; justify-content: space-between; align-items: baseline;">
                    <span style="font-size: 0.75rem; color: #94a3b8;">{labels.score}</span>
                    <span
                        style="font-family: 'JetBrains Mono', monospace; font-size: 1rem; font-weight: 700;"
                        style:color=rgb_css(accent)
                    >
                        {detail.score_text.clone()}
                    </span>
                </div>
                <div style="margin-top: 6px; height: 6px; background: rgba(255,255,255,0.06); border-radius: 3px; overflow: hidden;">
                    <div
                        style="height: 100%; border-radius: 3px;"
                        style:width=detail.bar_width_css()
                        style:background=bar_fill
                    />
                </div>
                {detail.risk.clone().map(|risk| view! {
                    <DetailRow label=labels.risk value=risk />
                })}
                {detail.temp_text.clone().map(|temp| view! {
                    <DetailRow label=labels.temp value=temp />
                })}
                {detail.source_label.map(|source| view! {
                    <DetailRow label=labels.source value=source.to_string() />
                })}
            </div>
        }
        .into_any()
    }
}

#[component]
fn DetailRow(label: &'static str, value: String) -> impl IntoView {
    view! {
        <div style="margin-top: 8px; padding-top: 8px; border-top: 1px solid rgba(30,41,59,0.8); display: flex; justify-content: space-between; gap: 12px; font-size: 0.75rem;">
            <span style="color: #94a3b8;">{label}</span>
            <span style="color: #e2e8f0; font-weight: 600; text-align: right;">{value}</span>
        </div>
    }
}

/// City name floating just above the hovered marker.
#[component]
pub fn MarkerTooltip() -> impl IntoView {
    let Hovered(hovered) = expect_context();
    let ActiveScreen(screen) = expect_context();
    let viewport: RwSignal<Viewport> = expect_context();

    let anchor = Memo::new(move |_| {
        let city_id = hovered.with(HoverSelection::active_id)?;
        let dataset = screen.get().dataset();
        let name = dataset.find(city_id)?.name.clone();
        let (x, y, radius) =
            viewport.with(|vp| HitIndex::for_dataset(dataset, vp).circle_of(city_id))?;
        Some((name, x, y - radius - TOOLTIP_GAP_PX))
    });

    move || {
        let Some((name, x, y)) = anchor.get() else {
            return ().into_any();
        };
        view! {
            <div
                class="tooltip-animate"
                style="position: absolute; z-index: 25; pointer-events: none; transform: translate(-50%, -100%); padding: 3px 8px; background: rgba(15,23,42,0.92); border: 1px solid #334155; border-radius: 4px; font-size: 0.75rem; font-weight: 600; color: #f8fafc; white-space: nowrap;"
                style:left=format!("{x}px")
                style:top=format!("{y}px")
            >
                {name}
            </div>
        }
        .into_any()
    }
}
