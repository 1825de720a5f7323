//! Provides the session texture cache.
//!
//! Textures are keyed by bare filename and survive across model loads, so a
//! texture shared by two archives is decoded once. The cache is bounded:
//! once `capacity` is reached the least recently used entry is evicted.
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//!
//! use objzip::textures::{Texture, TextureCache};
//!
//! let mut cache = TextureCache::new(4, 8);
//! let tex = Arc::new(Texture::from_rgba("wood.png", 1, 1, vec![0, 0, 0, 255]));
//! cache.insert("wood.png", tex.clone());
//! assert!(Arc::ptr_eq(&cache.get("wood.png").unwrap(), &tex));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::placeholder::generate_placeholder;
use super::TextureHandle;

struct CacheEntry {
    texture: TextureHandle,
    last_used: u64,
}

/// Bounded, explicitly clearable texture store.
pub struct TextureCache {
    entries: HashMap<String, CacheEntry>,
    capacity: usize,
    clock: u64,
    placeholder_size: u32,
    placeholder: Option<TextureHandle>,
}

impl TextureCache {
    /// Creates an empty cache holding at most `capacity` textures.
    ///
    /// A capacity of zero is bumped to one.
    pub fn new(capacity: usize, placeholder_size: u32) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            clock: 0,
            placeholder_size: placeholder_size.max(1),
            placeholder: None,
        }
    }

    /// Looks up a texture and marks it as recently used.
    pub fn get(&mut self, name: &str) -> Option<TextureHandle> {
        self.clock += 1;
        let now = self.clock;
        self.entries.get_mut(name).map(|entry| {
            entry.last_used = now;
            entry.texture.clone()
        })
    }

    /// Checks for a texture without touching its recency.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Stores a texture, evicting the least recently used entry when full.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use objzip::textures::{Texture, TextureCache};
    ///
    /// let mut cache = TextureCache::new(1, 8);
    /// cache.insert("a.png", Arc::new(Texture::from_rgba("a.png", 0, 0, vec![])));
    /// cache.insert("b.png", Arc::new(Texture::from_rgba("b.png", 0, 0, vec![])));
    /// assert!(!cache.contains("a.png"));
    /// assert!(cache.contains("b.png"));
    /// ```
    pub fn insert(&mut self, name: &str, texture: TextureHandle) {
        self.clock += 1;
        if !self.entries.contains_key(name) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        self.entries.insert(
            name.to_string(),
            CacheEntry {
                texture,
                last_used: self.clock,
            },
        );
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(name, _)| name.clone());
        if let Some(name) = oldest {
            log::debug!("Evicting texture {} from cache", name);
            self.entries.remove(&name);
        }
    }

    /// Drops every cached texture. The placeholder is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the session's fallback texture, generating it on first use.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use objzip::textures::TextureCache;
    ///
    /// let mut cache = TextureCache::new(4, 16);
    /// let a = cache.placeholder();
    /// assert!(a.is_placeholder());
    /// assert!(Arc::ptr_eq(&a, &cache.placeholder()));
    /// ```
    pub fn placeholder(&mut self) -> TextureHandle {
        let size = self.placeholder_size;
        self.placeholder
            .get_or_insert_with(|| Arc::new(generate_placeholder(size, size)))
            .clone()
    }
}
