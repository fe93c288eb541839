#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use js_sys::Reflect;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

use weatherguard_shared::TileSource;
use weatherguard_shared::geo::TileCoord;

const MAX_CONCURRENCY: usize = 6;
/// Loaded images kept across pans and screen switches.
pub const MAX_CACHED_TILES: usize = 192;
/// How many zoom levels up to look for a placeholder while a tile loads.
pub const MAX_ANCESTOR_LEVELS: u8 = 4;
const ONLOAD_HANDLE_KEY: &str = "__weatherguardTileOnload";
const ONERROR_HANDLE_KEY: &str = "__weatherguardTileOnerror";

/// A tile is identified by its source template and XYZ coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub source: &'static str,
    pub coord: TileCoord,
}

/// A decoded raster tile ready to draw.
#[derive(Clone)]
pub struct LoadedTile {
    pub key: TileKey,
    pub image: HtmlImageElement,
}

/// Fetches XYZ tiles for the current view with bounded concurrency.
///
/// `request` replaces the queue with whatever the view needs now, so tiles
/// panned out of view before their turn are never fetched. Requests already
/// in flight run to completion and are cached.
#[derive(Clone)]
pub struct TileLoader {
    inner: Rc<LoaderState>,
}

struct LoaderState {
    tiles: RwSignal<Vec<LoadedTile>>,
    queue: RefCell<VecDeque<(TileKey, String)>>,
    in_flight: RefCell<HashSet<TileKey>>,
    failed: RefCell<HashSet<TileKey>>,
    retina: Cell<bool>,
}

impl TileLoader {
    pub fn new(tiles: RwSignal<Vec<LoadedTile>>) -> Self {
        let retina = web_sys::window()
            .map(|w| w.device_pixel_ratio() >= 1.5)
            .unwrap_or(false);
        Self {
            inner: Rc::new(LoaderState {
                tiles,
                queue: RefCell::new(VecDeque::new()),
                in_flight: RefCell::new(HashSet::new()),
                failed: RefCell::new(HashSet::new()),
                retina: Cell::new(retina),
            }),
        }
    }

    /// Queue the tiles in `wanted` (priority order) that are not yet loaded.
    pub fn request(&self, source: TileSource, wanted: &[TileCoord]) {
        let wanted_keys: Vec<TileKey> = wanted
            .iter()
            .map(|&coord| TileKey {
                source: source.url_template,
                coord,
            })
            .collect();

        let loaded: HashSet<TileKey> = self
            .inner
            .tiles
            .with_untracked(|tiles| tiles.iter().map(|t| t.key).collect());
        let jobs = plan_requests(
            &wanted_keys,
            &loaded,
            &self.inner.in_flight.borrow(),
            &self.inner.failed.borrow(),
        );

        let retina = self.inner.retina.get();
        *self.inner.queue.borrow_mut() = jobs
            .into_iter()
            .map(|key| (key, source.url(key.coord, retina)))
            .collect();

        self.evict(&wanted_keys);
        pump_queue(self.inner.clone());
    }

    fn evict(&self, wanted: &[TileKey]) {
        let keep: HashSet<TileKey> = wanted.iter().copied().collect();
        let victims: HashSet<TileKey> = self.inner.tiles.with_untracked(|tiles| {
            let keys: Vec<TileKey> = tiles.iter().map(|t| t.key).collect();
            eviction_victims(&keys, &keep, MAX_CACHED_TILES)
                .into_iter()
                .collect()
        });
        if victims.is_empty() {
            return;
        }
        self.inner
            .tiles
            .update(|tiles| tiles.retain(|t| !victims.contains(&t.key)));
    }
}

/// Keys from `wanted`, in order, that still need fetching.
pub fn plan_requests(
    wanted: &[TileKey],
    loaded: &HashSet<TileKey>,
    in_flight: &HashSet<TileKey>,
    failed: &HashSet<TileKey>,
) -> Vec<TileKey> {
    let mut seen = HashSet::new();
    wanted
        .iter()
        .copied()
        .filter(|key| !loaded.contains(key) && !in_flight.contains(key) && !failed.contains(key))
        .filter(|key| seen.insert(*key))
        .collect()
}

/// Oldest cached keys to drop so at most `cap` remain, never dropping one in `keep`.
pub fn eviction_victims(cached: &[TileKey], keep: &HashSet<TileKey>, cap: usize) -> Vec<TileKey> {
    let excess = cached.len().saturating_sub(cap);
    cached
        .iter()
        .filter(|key| !keep.contains(key))
        .take(excess)
        .copied()
        .collect()
}

/// The tile `levels` zooms up that contains `coord`, with the source
/// rectangle `(sx, sy, size)` inside it in image pixels.
pub fn ancestor(coord: TileCoord, levels: u8) -> Option<(TileCoord, f64, f64, f64)> {
    if levels == 0 || levels > coord.z {
        return None;
    }
    let parent = TileCoord {
        z: coord.z - levels,
        x: coord.x >> levels,
        y: coord.y >> levels,
    };
    let span = 1u32 << levels;
    let size = weatherguard_shared::geo::TILE_SIZE / span as f64;
    let sx = (coord.x % span) as f64 * size;
    let sy = (coord.y % span) as f64 * size;
    Some((parent, sx, sy, size))
}

fn pump_queue(state: Rc<LoaderState>) {
    while state.in_flight.borrow().len() < MAX_CONCURRENCY {
        let Some((key, url)) = state.queue.borrow_mut().pop_front() else {
            break;
        };
        state.in_flight.borrow_mut().insert(key);

        let state_next = state.clone();
        let on_done: Rc<dyn Fn(Option<HtmlImageElement>)> = Rc::new(move |image| {
            state_next.in_flight.borrow_mut().remove(&key);
            match image {
                Some(image) => upsert_tile(state_next.tiles, LoadedTile { key, image }),
                None => {
                    state_next.failed.borrow_mut().insert(key);
                }
            }
            pump_queue(state_next.clone());
        });

        load_tile(url, on_done);
    }
}

fn load_tile(url: String, on_done: Rc<dyn Fn(Option<HtmlImageElement>)>) {
    let img = match HtmlImageElement::new() {
        Ok(img) => img,
        Err(_) => {
            on_done(None);
            return;
        }
    };

    let img_for_load = img.clone();
    let on_done_load = on_done.clone();
    let onload = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_load);

        let img_for_decode = img_for_load.clone();
        let on_done_load = on_done_load.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let _ = JsFuture::from(img_for_decode.decode()).await;
            on_done_load(Some(img_for_decode));
        });
    });

    let img_for_error = img.clone();
    let on_done_error = on_done.clone();
    let url_for_error = url.clone();
    let onerror = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_error);
        web_sys::console::warn_1(&format!("tile failed to load: {url_for_error}").into());
        on_done_error(None);
    });

    let onload_js = onload.into_js_value();
    let onerror_js = onerror.into_js_value();
    img.set_onload(Some(onload_js.unchecked_ref()));
    img.set_onerror(Some(onerror_js.unchecked_ref()));
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONLOAD_HANDLE_KEY),
        &onload_js,
    );
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONERROR_HANDLE_KEY),
        &onerror_js,
    );
    img.set_src(&url);
}

fn clear_image_handlers(img: &HtmlImageElement) {
    img.set_onload(None);
    img.set_onerror(None);
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY));
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY));
}

fn upsert_tile(tiles_signal: RwSignal<Vec<LoadedTile>>, incoming: LoadedTile) {
    tiles_signal.update(|loaded| {
        if let Some(existing) = loaded.iter_mut().find(|tile| tile.key == incoming.key) {
            *existing = incoming;
            return;
        }
        loaded.push(incoming);
    });
}
