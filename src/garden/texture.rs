//! Decoded texture cache
//!
//! Plant textures arrive as encoded image payloads. Decoding happens in
//! small batches at the start of a tick ([`TextureCache::pump`]); drawing only
//! ever polls, so a texture that is not decoded yet is skipped for the frame
//! rather than awaited.
//!
//! Entries are keyed by payload identity and bounded by an LRU capacity.
//! Textures of the live plant set ([`TextureCache::set_live`]) are never
//! evicted; when the live set alone exceeds the capacity the cache grows to
//! hold it and shrinks back once those payloads leave the garden.
//! Payloads that fail to decode are remembered as failed and never retried.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use base64::Engine;
use image::RgbaImage;

use crate::core::{Error, Result};

/// Identity of a texture payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureKey(u64);

impl TextureKey {
    pub fn of(payload: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        payload.hash(&mut hasher);
        Self(hasher.finish())
    }
}

enum Slot {
    /// Waiting to be decoded; holds the payload until then.
    Pending(String),
    Ready(Arc<RgbaImage>),
    Failed,
}

/// Poll result for one texture.
#[derive(Clone, Debug)]
pub enum TextureStatus {
    Ready(Arc<RgbaImage>),
    Pending,
    Failed,
    Missing,
}

/// LRU cache of decoded textures
///
/// Access order is tracked to determine which entry to evict when the cache
/// is full.
pub struct TextureCache {
    entries: HashMap<TextureKey, Slot>,
    /// Access order: oldest first, newest last
    access_order: Vec<TextureKey>,
    /// Keys awaiting decode, in request order. Each key appears at most
    /// once and only while its slot is pending.
    pending: VecDeque<TextureKey>,
    /// Keys referenced by the current plant snapshot
    live: HashSet<TextureKey>,
    max_entries: usize,
}

impl TextureCache {
    /// Create a cache holding at most `max_entries` textures (at least one).
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: HashMap::with_capacity(max_entries),
            access_order: Vec::with_capacity(max_entries),
            pending: VecDeque::new(),
            live: HashSet::new(),
            max_entries,
        }
    }

    /// Make sure `payload` is known to the cache, queueing it for decode if
    /// it is new. Returns its key. Empty payloads are ignored.
    pub fn request(&mut self, payload: &str) -> Option<TextureKey> {
        if payload.is_empty() {
            return None;
        }
        let key = TextureKey::of(payload);
        if self.entries.contains_key(&key) {
            self.update_access_order(key);
            return Some(key);
        }

        while self.entries.len() >= self.max_entries {
            if !self.evict_oldest() {
                break;
            }
        }
        self.entries.insert(key, Slot::Pending(payload.to_string()));
        self.access_order.push(key);
        self.pending.push_back(key);
        Some(key)
    }

    /// Replace the live set with the payloads of the current snapshot and
    /// queue any that are new. Entries no longer live become evictable, and
    /// surplus beyond the capacity is dropped right away.
    pub fn set_live<'a>(&mut self, payloads: impl IntoIterator<Item = &'a str>) {
        let payloads: Vec<&str> = payloads.into_iter().filter(|p| !p.is_empty()).collect();
        // Mark first so filling the cache never evicts a texture still in use
        self.live = payloads.iter().map(|p| TextureKey::of(p)).collect();
        for payload in payloads {
            self.request(payload);
        }
        while self.entries.len() > self.max_entries {
            if !self.evict_oldest() {
                break;
            }
        }
    }

    /// Status of a payload without queueing it.
    pub fn lookup(&mut self, payload: &str) -> TextureStatus {
        if payload.is_empty() {
            return TextureStatus::Missing;
        }
        self.status(TextureKey::of(payload))
    }

    /// Decode up to `budget` queued payloads. Returns how many were processed.
    pub fn pump(&mut self, budget: usize) -> usize {
        let mut processed = 0;
        while processed < budget {
            let Some(key) = self.pending.pop_front() else { break };
            let Some(slot) = self.entries.get_mut(&key) else { continue };
            let Slot::Pending(payload) = &mut *slot else { continue };
            let payload = std::mem::take(payload);

            *slot = match decode_payload(&payload) {
                Ok(img) => Slot::Ready(Arc::new(img)),
                Err(e) => {
                    log::warn!("Texture decode failed ({} bytes): {}", payload.len(), e);
                    Slot::Failed
                }
            };
            processed += 1;
        }
        processed
    }

    /// Non-blocking poll. Marks the entry as recently used.
    pub fn status(&mut self, key: TextureKey) -> TextureStatus {
        let status = match self.entries.get(&key) {
            Some(Slot::Ready(img)) => TextureStatus::Ready(img.clone()),
            Some(Slot::Pending(_)) => TextureStatus::Pending,
            Some(Slot::Failed) => TextureStatus::Failed,
            None => return TextureStatus::Missing,
        };
        self.update_access_order(key);
        status
    }

    /// The decoded image, if ready.
    pub fn get(&mut self, key: TextureKey) -> Option<Arc<RgbaImage>> {
        match self.status(key) {
            TextureStatus::Ready(img) => Some(img),
            _ => None,
        }
    }

    pub fn contains(&self, key: TextureKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Evict the least recently used entry outside the live set. Returns
    /// false when every entry is live.
    fn evict_oldest(&mut self) -> bool {
        let Some(pos) = self.access_order.iter().position(|k| !self.live.contains(k)) else {
            return false;
        };
        let key = self.access_order.remove(pos);
        if let Some(Slot::Pending(_)) = self.entries.remove(&key) {
            self.pending.retain(|&k| k != key);
        }
        true
    }

    /// Update access order by moving a key to the end (most recent)
    fn update_access_order(&mut self, key: TextureKey) {
        if let Some(pos) = self.access_order.iter().position(|&k| k == key) {
            self.access_order.remove(pos);
        }
        self.access_order.push(key);
    }
}

/// Decode a data URL (`data:image/png;base64,...`) or bare base64 payload.
pub fn decode_payload(payload: &str) -> Result<RgbaImage> {
    let encoded = match payload.split_once(',') {
        Some((header, data)) if header.starts_with("data:") => {
            if !header.ends_with(";base64") {
                return Err(Error::Texture(format!("unsupported data URL header '{}'", header)));
            }
            data
        }
        _ => payload,
    };
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::Texture(format!("base64: {}", e)))?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

/// Encode an image as a PNG data URL, the form plant textures travel in.
pub fn encode_data_url(img: &RgbaImage) -> Result<String> {
    use image::ImageEncoder;

    let mut png_data = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png_data).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&png_data);
    Ok(format!("data:image/png;base64,{}", b64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn payload(color: [u8; 4]) -> String {
        let img = RgbaImage::from_pixel(4, 4, Rgba(color));
        encode_data_url(&img).unwrap()
    }

    #[test]
    fn test_decode_data_url_and_bare_base64() {
        let url = payload([10, 20, 30, 255]);
        let img = decode_payload(&url).unwrap();
        assert_eq!(img.dimensions(), (4, 4));
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 255]);

        let bare = url.split_once(',').unwrap().1;
        assert!(decode_payload(bare).is_ok());
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(decode_payload("data:image/png,abc"), Err(Error::Texture(_))));
        assert!(matches!(decode_payload("!!!not base64"), Err(Error::Texture(_))));
        // Valid base64 of bytes that are not an image
        assert!(matches!(decode_payload("aGVsbG8gd29ybGQ="), Err(Error::Image(_))));
    }

    #[test]
    fn test_pending_until_pumped() {
        let mut cache = TextureCache::new(8);
        let key = cache.request(&payload([1, 2, 3, 255])).unwrap();
        assert!(matches!(cache.status(key), TextureStatus::Pending));
        assert!(cache.get(key).is_none());

        assert_eq!(cache.pump(4), 1);
        assert!(cache.get(key).is_some());
        assert_eq!(cache.pending_count(), 0);
    }

    #[test]
    fn test_duplicate_request_decodes_once() {
        let mut cache = TextureCache::new(8);
        let p = payload([9, 9, 9, 255]);
        let a = cache.request(&p).unwrap();
        let b = cache.request(&p).unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.pump(10), 1);
    }

    #[test]
    fn test_pump_respects_budget() {
        let mut cache = TextureCache::new(8);
        for i in 0..5u8 {
            cache.request(&payload([i, 0, 0, 255]));
        }
        assert_eq!(cache.pump(2), 2);
        assert_eq!(cache.pending_count(), 3);
        assert_eq!(cache.pump(10), 3);
    }

    #[test]
    fn test_failed_payload_not_retried() {
        let mut cache = TextureCache::new(8);
        let key = cache.request("data:image/png;base64,AAAA").unwrap();
        cache.pump(1);
        assert!(matches!(cache.status(key), TextureStatus::Failed));
        // Re-request keeps the failed state without queueing a new decode
        cache.request("data:image/png;base64,AAAA");
        assert_eq!(cache.pending_count(), 0);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = TextureCache::new(2);
        let a = cache.request(&payload([1, 0, 0, 255])).unwrap();
        let b = cache.request(&payload([2, 0, 0, 255])).unwrap();
        cache.pump(10);
        // Touch a so b becomes the oldest
        assert!(cache.get(a).is_some());
        let c = cache.request(&payload([3, 0, 0, 255])).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(a));
        assert!(!cache.contains(b));
        assert!(cache.contains(c));
        assert!(matches!(cache.status(b), TextureStatus::Missing));
    }

    #[test]
    fn test_live_set_larger_than_capacity() {
        let mut cache = TextureCache::new(4);
        let payloads: Vec<String> = (0..10u8).map(|i| payload([i, 1, 2, 255])).collect();
        cache.set_live(payloads.iter().map(String::as_str));
        assert_eq!(cache.len(), 10);
        assert_eq!(cache.pending_count(), 10);

        for _ in 0..20 {
            // Repeated per-frame polling must not requeue anything
            for p in &payloads {
                cache.lookup(p);
            }
            cache.pump(3);
            assert!(cache.pending_count() <= cache.len());
        }
        assert_eq!(cache.pending_count(), 0);
        assert!(payloads.iter().all(|p| matches!(cache.lookup(p), TextureStatus::Ready(_))));

        // Garden shrinks: surplus entries go, the remaining live ones stay
        cache.set_live(payloads[..2].iter().map(String::as_str));
        assert_eq!(cache.len(), 4);
        assert!(payloads[..2].iter().all(|p| matches!(cache.lookup(p), TextureStatus::Ready(_))));
    }

    #[test]
    fn test_evicted_pending_leaves_queue() {
        let mut cache = TextureCache::new(2);
        for i in 0..6u8 {
            cache.request(&payload([i, 0, 0, 255]));
        }
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.pending_count(), 2);
    }

    #[test]
    fn test_lookup_does_not_queue() {
        let mut cache = TextureCache::new(2);
        assert!(matches!(cache.lookup(&payload([5, 5, 5, 255])), TextureStatus::Missing));
        assert!(cache.is_empty());
        assert_eq!(cache.pending_count(), 0);
    }

    #[test]
    fn test_empty_payload_ignored() {
        let mut cache = TextureCache::new(2);
        assert!(cache.request("").is_none());
        assert!(cache.is_empty());
    }
}
