use leptos::prelude::*;

use std::cell::RefCell;

use gloo_storage::Storage;
use weatherguard_shared::{CityId, CityRecord, DatasetKey, HoverSelection, pointer_transition};

use crate::canvas::MapCanvas;
use crate::colors::rgb_css;
use crate::detail::{DetailPanel, MarkerTooltip};
use crate::sidebar::Sidebar;
use crate::tiles::LoadedTile;
use crate::viewport::Viewport;

pub(crate) const SIDEBAR_WIDTH: f64 = 300.0;
const SETTINGS_KEY: &str = "weatherguard_settings";
/// Screen pixels moved per arrow key press.
const KEY_PAN_PX: f64 = 80.0;
/// Wheel-delta units per `+` / `-` press (half a zoom level).
const KEY_ZOOM_DELTA: f64 = 200.0;

struct KeydownBinding {
    window: web_sys::Window,
    _handler: wasm_bindgen::closure::Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

/// Newtype wrappers so each signal gets its own context slot.
#[derive(Clone, Copy)]
pub(crate) struct ActiveScreen(pub RwSignal<DatasetKey>);
#[derive(Clone, Copy)]
pub(crate) struct Hovered(pub RwSignal<HoverSelection>);
#[derive(Clone, Copy)]
pub(crate) struct SidebarOpen(pub RwSignal<bool>);

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct Settings {
    screen: DatasetKey,
    sidebar_open: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen: DatasetKey::Monitor,
            sidebar_open: true,
        }
    }
}

/// Run the leave/enter events for a pointer moving from `previous` to `next`
/// (marker ids, `None` for empty map). Returns whether the selection changed.
pub(crate) fn apply_marker_events(
    selection: &mut HoverSelection,
    previous: Option<CityId>,
    next: Option<CityId>,
    cities: &[CityRecord],
) -> bool {
    let mut changed = false;
    for event in pointer_transition(previous, next) {
        changed |= selection.apply(event, cities);
    }
    changed
}

/// Signal-side [`apply_marker_events`]: writes `hovered` only on change.
pub(crate) fn dispatch_marker_events(
    hovered: RwSignal<HoverSelection>,
    previous: Option<CityId>,
    next: Option<CityId>,
    cities: &[CityRecord],
) {
    if previous == next {
        return;
    }
    let mut selection = hovered.get_untracked();
    if apply_marker_events(&mut selection, previous, next, cities) {
        hovered.set(selection);
    }
}

/// Viewport a screen starts from, sized to the current canvas.
fn initial_viewport(key: DatasetKey, size: (f64, f64)) -> Viewport {
    let dataset = key.dataset();
    let mut vp = Viewport::new(dataset.center, dataset.zoom);
    vp.set_size(size.0, size.1);
    vp
}

/// Root application component. Provides global reactive signals via context.
#[component]
pub fn App() -> impl IntoView {
    let saved: Settings = gloo_storage::LocalStorage::get(SETTINGS_KEY).unwrap_or_default();

    let screen: RwSignal<DatasetKey> = RwSignal::new(saved.screen);
    let hovered: RwSignal<HoverSelection> = RwSignal::new(HoverSelection::None);
    let viewport: RwSignal<Viewport> =
        RwSignal::new(initial_viewport(saved.screen, Viewport::default().size()));
    let loaded_tiles: RwSignal<Vec<LoadedTile>> = RwSignal::new(Vec::new());
    let sidebar_open: RwSignal<bool> = RwSignal::new(saved.sidebar_open);

    provide_context(ActiveScreen(screen));
    provide_context(Hovered(hovered));
    provide_context(viewport);
    provide_context(loaded_tiles);
    provide_context(SidebarOpen(sidebar_open));

    // Persist settings to localStorage on any change
    Effect::new(move || {
        let settings = Settings {
            screen: screen.get(),
            sidebar_open: sidebar_open.get(),
        };
        if let Err(e) = gloo_storage::LocalStorage::set(SETTINGS_KEY, &settings) {
            web_sys::console::warn_1(&format!("failed to persist settings: {e}").into());
        }
    });

    // Switching screens drops the hover and recenters on the new dataset.
    Effect::new(move |previous: Option<DatasetKey>| {
        let key = screen.get();
        if previous.is_some_and(|prev| prev != key) {
            hovered.update(|sel| {
                sel.clear();
            });
            viewport.update(|vp| *vp = initial_viewport(key, vp.size()));
        }
        key
    });

    // Global keyboard shortcuts
    Effect::new(move || {
        use wasm_bindgen::prelude::*;

        let Some(window) = web_sys::window() else {
            return;
        };

        KEYDOWN_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "keydown",
                    old._handler.as_ref().unchecked_ref(),
                );
            }
        });

        let handler =
            Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
                if e.ctrl_key() || e.meta_key() || e.alt_key() {
                    return;
                }
                let target_tag = e
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok())
                    .map(|el| el.tag_name())
                    .unwrap_or_default();
                if target_tag == "INPUT" || target_tag == "TEXTAREA" {
                    return;
                }

                match e.key().as_str() {
                    "Escape" => {
                        if hovered.with_untracked(|sel| sel.current().is_some()) {
                            hovered.update(|sel| {
                                sel.clear();
                            });
                        }
                    }
                    "1" => screen.set(DatasetKey::Monitor),
                    "2" => screen.set(DatasetKey::Regions),
                    "n" => screen.update(|key| *key = key.next()),
                    "s" => sidebar_open.update(|v| *v = !*v),
                    "r" | "0" => {
                        let dataset = screen.get_untracked().dataset();
                        if let Some(bounds) = dataset.bounds() {
                            viewport.update(|vp| {
                                vp.fit_bounds(&bounds, dataset.tile_source.max_zoom as f64)
                            });
                        }
                    }
                    "ArrowLeft" => {
                        e.prevent_default();
                        viewport.update(|vp| vp.pan(KEY_PAN_PX, 0.0));
                    }
                    "ArrowRight" => {
                        e.prevent_default();
                        viewport.update(|vp| vp.pan(-KEY_PAN_PX, 0.0));
                    }
                    "ArrowUp" => {
                        e.prevent_default();
                        viewport.update(|vp| vp.pan(0.0, KEY_PAN_PX));
                    }
                    "ArrowDown" => {
                        e.prevent_default();
                        viewport.update(|vp| vp.pan(0.0, -KEY_PAN_PX));
                    }
                    "+" | "=" => {
                        e.prevent_default();
                        viewport.update(|vp| {
                            let (cx, cy) = (vp.width / 2.0, vp.height / 2.0);
                            vp.zoom_at(-KEY_ZOOM_DELTA, cx, cy);
                        });
                    }
                    "-" => {
                        e.prevent_default();
                        viewport.update(|vp| {
                            let (cx, cy) = (vp.width / 2.0, vp.height / 2.0);
                            vp.zoom_at(KEY_ZOOM_DELTA, cx, cy);
                        });
                    }
                    _ => {}
                }
            });

        if window
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            KEYDOWN_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(KeydownBinding {
                    window: window.clone(),
                    _handler: handler,
                });
            });
        }
    });

    view! {
        <div style="width: 100%; height: 100%; display: flex; background: #020617; color: #e2e8f0; font-family: 'Inter', system-ui, sans-serif;">
            <div
                style="flex-shrink: 0; height: 100%; overflow: hidden; transition: width 0.2s; border-right: 1px solid #1e293b;"
                style:width=move || if sidebar_open.get() { format!("{SIDEBAR_WIDTH}px") } else { "0px".to_string() }
            >
                <Sidebar />
            </div>
            <div style="flex: 1; height: 100%; position: relative; overflow: hidden;">
                <MapCanvas />
                <SidebarToggle />
                <MapHud />
                <MarkerTooltip />
                <DetailPanel />
                <Attribution />
            </div>
        </div>
    }
}

/// Button on the map's left edge that shows or hides the sidebar.
#[component]
fn SidebarToggle() -> impl IntoView {
    let SidebarOpen(sidebar_open) = expect_context();

    view! {
        <button
            title=move || if sidebar_open.get() { "Hide sidebar (s)" } else { "Show sidebar (s)" }
            style="position: absolute; top: 16px; left: 16px; z-index: 20; width: 32px; height: 32px; background: rgba(15,23,42,0.9); border: 1px solid #334155; border-radius: 6px; cursor: pointer; color: #94a3b8; font-size: 1.1rem; line-height: 1;"
            on:click=move |_| sidebar_open.update(|v| *v = !*v)
        >
            {move || if sidebar_open.get() { "\u{00AB}" } else { "\u{00BB}" }}
        </button>
    }
}

/// Screen headline, elevated-city count and zoom readout over the map.
#[component]
fn MapHud() -> impl IntoView {
    let ActiveScreen(screen) = expect_context();
    let viewport: RwSignal<Viewport> = expect_context();

    let zoom_text = Memo::new(move |_| format!("z {:.1}", viewport.get().zoom));
    let critical_count = Memo::new(move |_| {
        screen
            .get()
            .dataset()
            .cities
            .iter()
            .filter(|city| city.danger_class().is_elevated())
            .count()
    });

    view! {
        <div style="position: absolute; top: 16px; left: 60px; z-index: 15; pointer-events: none; padding: 6px 12px; background: rgba(15,23,42,0.85); border: 1px solid #1e293b; border-radius: 8px; display: flex; gap: 10px; align-items: baseline;">
            <span style="font-weight: 800; letter-spacing: 0.08em;">
                {move || screen.get().dataset().headline}
                " "
                <span style:color=move || rgb_css(screen.get().dataset().headline_accent_rgb)>
                    {move || screen.get().dataset().headline_accent}
                </span>
            </span>
            <span style="font-family: 'JetBrains Mono', monospace; font-size: 0.7rem; color: #f87171;">{move || format!("{} CRITICAL", critical_count.get())}</span>
            <span style="font-family: 'JetBrains Mono', monospace; font-size: 0.7rem; color: #64748b;">{move || zoom_text.get()}</span>
        </div>
    }
}

#[component]
fn Attribution() -> impl IntoView {
    let ActiveScreen(screen) = expect_context();

    view! {
        <div style="position: absolute; right: 0; bottom: 0; z-index: 15; padding: 2px 6px; background: rgba(2,6,23,0.7); color: #94a3b8; font-size: 0.65rem; pointer-events: none;">
            {move || screen.get().dataset().tile_source.attribution}
        </div>
    }
}
