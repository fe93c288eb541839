use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, PointerEvent, WheelEvent,
};

use weatherguard_shared::geo::{TILE_SIZE, TileCoord};
use weatherguard_shared::{
    CityId, Dataset, DatasetKey, HoverSelection, MarkerSpec, layout_markers,
};

use crate::app::{ActiveScreen, Hovered, dispatch_marker_events};
use crate::colors::{rgb_css, rgba_css};
use crate::hit_test::HitIndex;
use crate::render_loop::RenderScheduler;
use crate::tiles::{LoadedTile, MAX_ANCESTOR_LEVELS, TileKey, TileLoader, ancestor};
use crate::viewport::Viewport;

const BACKGROUND: &str = "#0b1120";
/// Pinch distance change (px) is scaled into wheel-delta units.
const PINCH_DELTA_SCALE: f64 = 2.0;

struct ResizeBinding {
    window: web_sys::Window,
    _handler: Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

/// Tile map with danger markers. Owns pan/zoom input and turns pointer
/// movement into marker enter/leave events.
#[component]
pub fn MapCanvas() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let Hovered(hovered) = expect_context();
    let ActiveScreen(screen) = expect_context();
    let loaded_tiles: RwSignal<Vec<LoadedTile>> = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let loader = TileLoader::new(loaded_tiles);

    // Drag state
    let is_dragging = Rc::new(Cell::new(false));
    let last_x = Rc::new(Cell::new(0.0f64));
    let last_y = Rc::new(Cell::new(0.0f64));
    let pinch_dist = Rc::new(Cell::new(0.0f64));

    // Marker the map pointer is over, as last reported by hit-testing.
    let tracked: Rc<Cell<Option<CityId>>> = Rc::new(Cell::new(None));
    // Last canvas-local pointer position while it is over the map.
    let pointer_at: Rc<Cell<Option<(f64, f64)>>> = Rc::new(Cell::new(None));

    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));
    let context_warned = Rc::new(Cell::new(false));

    let scheduler = RenderScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let canvas: &HtmlCanvasElement = &canvas;
        let Some(parent) = canvas.parent_element() else {
            return;
        };
        let w = parent.client_width() as f64;
        let h = parent.client_height() as f64;
        if w <= 0.0 || h <= 0.0 {
            return;
        }

        let dpr = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0)
            .max(1.0);
        let pw = (w * dpr).round() as u32;
        let ph = (h * dpr).round() as u32;
        if canvas.width() != pw || canvas.height() != ph {
            canvas.set_width(pw);
            canvas.set_height(ph);
        }
        if viewport.with_untracked(|vp| vp.width != w || vp.height != h) {
            // The viewport effect repaints at the new size.
            viewport.update(|vp| vp.set_size(w, h));
            return;
        }

        let ctx = {
            let mut slot = cached_ctx.borrow_mut();
            if slot.is_none() {
                *slot = canvas
                    .get_context("2d")
                    .ok()
                    .flatten()
                    .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
            }
            match slot.clone() {
                Some(ctx) => ctx,
                None => {
                    if !context_warned.replace(true) {
                        web_sys::console::warn_1(&"canvas 2d context unavailable".into());
                    }
                    return;
                }
            }
        };
        ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();

        let dataset = screen.get_untracked().dataset();
        let vp = viewport.get_untracked();
        let hovered_id = hovered.with_untracked(HoverSelection::active_id);
        loaded_tiles.with_untracked(|tiles| {
            paint_map(PaintInput {
                ctx: &ctx,
                vp: &vp,
                dataset,
                tiles,
                hovered_id,
            })
        });
    });
    let scheduler = Rc::new(scheduler);

    // Anything visible changed: repaint on the next frame.
    let sched_state = scheduler.clone();
    Effect::new(move || {
        viewport.track();
        loaded_tiles.track();
        hovered.track();
        screen.track();
        sched_state.mark_dirty();
    });

    // Fetch whatever tiles the current view needs.
    Effect::new(move || {
        let source = screen.get().dataset().tile_source;
        let wanted: Vec<TileCoord> = viewport.with(|vp| {
            vp.visible_tiles(source.max_zoom)
                .into_iter()
                .map(|(_, tile)| tile)
                .collect()
        });
        loader.request(source, &wanted);
    });

    // Wheel and keyboard zoom or pan move markers under a still pointer, so
    // hit-test again. A screen switch replaces every marker and only forgets
    // the old hit. Drags cleared the hover when they started.
    Effect::new({
        let tracked = tracked.clone();
        let pointer_at = pointer_at.clone();
        let is_dragging = is_dragging.clone();
        move |previous: Option<DatasetKey>| {
            let key = screen.get();
            viewport.track();
            if previous != Some(key) {
                tracked.set(None);
                return key;
            }
            if is_dragging.get() {
                return key;
            }
            let Some((x, y)) = pointer_at.get() else {
                return key;
            };
            let dataset = key.dataset();
            let hit =
                viewport.with_untracked(|vp| HitIndex::for_dataset(dataset, vp).find_at(x, y));
            let prev_hit = tracked.replace(hit);
            dispatch_marker_events(hovered, prev_hit, hit, &dataset.cities);
            key
        }
    });

    // Window resizes change the container size without touching any signal.
    Effect::new({
        let scheduler = scheduler.clone();
        move || {
            let Some(window) = web_sys::window() else {
                return;
            };
            RESIZE_BINDING.with(|slot| {
                if let Some(old) = slot.borrow_mut().take() {
                    let _ = old.window.remove_event_listener_with_callback(
                        "resize",
                        old._handler.as_ref().unchecked_ref(),
                    );
                }
            });
            let scheduler = scheduler.clone();
            let handler = Closure::<dyn Fn()>::new(move || scheduler.mark_dirty());
            if window
                .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
                .is_ok()
            {
                RESIZE_BINDING.with(|slot| {
                    *slot.borrow_mut() = Some(ResizeBinding {
                        window: window.clone(),
                        _handler: handler,
                    });
                });
            }
        }
    });

    // --- Input handlers ---

    let local_point = move |client_x: f64, client_y: f64| -> (f64, f64) {
        canvas_ref
            .get_untracked()
            .map(|el| {
                let rect = el.get_bounding_client_rect();
                (client_x - rect.left(), client_y - rect.top())
            })
            .unwrap_or((client_x, client_y))
    };

    let set_cursor = move |cursor: &str| {
        if let Some(canvas) = canvas_ref.get_untracked()
            && let Some(el) = canvas.dyn_ref::<web_sys::HtmlElement>()
        {
            el.style().set_property("cursor", cursor).ok();
        }
    };

    let clear_hover = {
        let tracked = tracked.clone();
        move || {
            tracked.set(None);
            if hovered.with_untracked(|sel| sel.current().is_some()) {
                hovered.update(|sel| {
                    sel.clear();
                });
            }
        }
    };

    let on_wheel = {
        let pointer_at = pointer_at.clone();
        move |e: WheelEvent| {
            e.prevent_default();
            let (x, y) = local_point(e.client_x() as f64, e.client_y() as f64);
            pointer_at.set(Some((x, y)));
            viewport.update(|vp| vp.zoom_at(e.delta_y(), x, y));
        }
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        let clear_hover = clear_hover.clone();
        move |e: PointerEvent| {
            if e.button() != 0 {
                return;
            }
            is_dragging.set(true);
            clear_hover();
            last_x.set(e.client_x() as f64);
            last_y.set(e.client_y() as f64);

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
            }
            set_cursor("grabbing");
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        let tracked = tracked.clone();
        let pointer_at = pointer_at.clone();
        move |e: PointerEvent| {
            if is_dragging.get() {
                let dx = e.client_x() as f64 - last_x.get();
                let dy = e.client_y() as f64 - last_y.get();
                last_x.set(e.client_x() as f64);
                last_y.set(e.client_y() as f64);
                viewport.update(|vp| vp.pan(dx, dy));
                return;
            }

            let (x, y) = local_point(e.client_x() as f64, e.client_y() as f64);
            pointer_at.set(Some((x, y)));
            let dataset = screen.get_untracked().dataset();
            let hit =
                viewport.with_untracked(|vp| HitIndex::for_dataset(dataset, vp).find_at(x, y));

            let previous = tracked.replace(hit);
            dispatch_marker_events(hovered, previous, hit, &dataset.cities);
            set_cursor(if hit.is_some() { "pointer" } else { "grab" });
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        let pointer_at = pointer_at.clone();
        move |e: PointerEvent| {
            is_dragging.set(false);
            pointer_at.set(Some(local_point(e.client_x() as f64, e.client_y() as f64)));
            set_cursor("grab");
        }
    };

    let on_pointer_leave = {
        let is_dragging = is_dragging.clone();
        let pointer_at = pointer_at.clone();
        move |_: PointerEvent| {
            // Captured drags keep receiving moves outside the canvas.
            if !is_dragging.get() {
                pointer_at.set(None);
                clear_hover();
            }
        }
    };

    let on_touch_start = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                let dx = (t1.client_x() - t0.client_x()) as f64;
                let dy = (t1.client_y() - t0.client_y()) as f64;
                pinch_dist.set((dx * dx + dy * dy).sqrt());
            }
        }
    };

    let on_touch_move = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() != 2 {
                return;
            }
            e.prevent_default();
            let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                return;
            };
            let dx = (t1.client_x() - t0.client_x()) as f64;
            let dy = (t1.client_y() - t0.client_y()) as f64;
            let new_dist = (dx * dx + dy * dy).sqrt();
            let old_dist = pinch_dist.get();
            if old_dist > 0.0 {
                let (mx, my) = local_point(
                    (t0.client_x() + t1.client_x()) as f64 / 2.0,
                    (t0.client_y() + t1.client_y()) as f64 / 2.0,
                );
                let delta = -(new_dist - old_dist) * PINCH_DELTA_SCALE;
                viewport.update(|vp| vp.zoom_at(delta, mx, my));
            }
            pinch_dist.set(new_dist);
        }
    };

    view! {
        <div
            style="position: absolute; inset: 0; overflow: hidden;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:pointercancel=move |_| is_dragging.set(false)
            on:pointerleave=on_pointer_leave
            on:touchstart=on_touch_start
            on:touchmove=on_touch_move
        >
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
            />
        </div>
    }
}

struct PaintInput<'a> {
    ctx: &'a CanvasRenderingContext2d,
    vp: &'a Viewport,
    dataset: &'a Dataset,
    tiles: &'a [LoadedTile],
    hovered_id: Option<CityId>,
}

fn paint_map(input: PaintInput<'_>) {
    let PaintInput {
        ctx,
        vp,
        dataset,
        tiles,
        hovered_id,
    } = input;
    let (w, h) = (vp.width, vp.height);

    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, w, h);

    let source = dataset.tile_source;
    let by_key: HashMap<TileKey, &HtmlImageElement> = tiles
        .iter()
        .filter(|t| t.key.source == source.url_template)
        .map(|t| (t.key, &t.image))
        .collect();

    for (col, tile) in vp.visible_tiles(source.max_zoom) {
        let (x, y, size) = vp.tile_screen_rect(col, tile);
        // Floor the start and ceil the end so neighbours overlap instead of leaving seams.
        let dx = x.floor();
        let dy = y.floor();
        let dw = (x + size).ceil() - dx;
        let dh = (y + size).ceil() - dy;

        let key = TileKey {
            source: source.url_template,
            coord: tile,
        };
        if let Some(image) = by_key.get(&key) {
            ctx.draw_image_with_html_image_element_and_dw_and_dh(image, dx, dy, dw, dh)
                .ok();
            continue;
        }

        // Stretch a cached ancestor over the gap until the tile arrives.
        for levels in 1..=MAX_ANCESTOR_LEVELS {
            let Some((parent, sx, sy, ssize)) = ancestor(tile, levels) else {
                break;
            };
            let parent_key = TileKey {
                source: source.url_template,
                coord: parent,
            };
            let Some(image) = by_key.get(&parent_key) else {
                continue;
            };
            let k = image_scale(image);
            ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                sx * k,
                sy * k,
                ssize * k,
                ssize * k,
                dx,
                dy,
                dw,
                dh,
            )
            .ok();
            break;
        }
    }

    let markers = layout_markers(&dataset.cities, &dataset.marker);
    for marker in &markers {
        draw_marker(ctx, vp, dataset, marker, hovered_id == Some(marker.city_id));
    }
}

/// Retina tiles are 512px images standing in for 256px tiles.
fn image_scale(image: &HtmlImageElement) -> f64 {
    match image.natural_width() {
        0 => 1.0,
        px => px as f64 / TILE_SIZE,
    }
}

fn draw_marker(
    ctx: &CanvasRenderingContext2d,
    vp: &Viewport,
    dataset: &Dataset,
    marker: &MarkerSpec,
    hovered: bool,
) {
    let (x, y) = vp.latlng_to_screen(marker.lat, marker.lng);
    let reach = marker.radius + dataset.marker.hover_stroke_width;
    if x + reach < 0.0 || y + reach < 0.0 || x - reach > vp.width || y - reach > vp.height {
        return;
    }

    let style = marker.style(&dataset.marker, hovered);
    ctx.begin_path();
    if ctx.arc(x, y, marker.radius, 0.0, TAU).is_err() {
        return;
    }
    ctx.set_fill_style_str(&rgba_css(style.fill_rgb, style.fill_opacity));
    ctx.fill();
    if style.stroke_width > 0.0 {
        ctx.set_stroke_style_str(&rgb_css(style.stroke_rgb));
        ctx.set_line_width(style.stroke_width);
        ctx.stroke();
    }
}
