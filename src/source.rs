// source.rs
//
// Copyright (c) 2026  giflet developers
//

use crate::block::Animation;
use crate::decode::{decode, is_gif};
use crate::error::DecodeError;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared outcome of resolving and decoding one source.
///
/// Every listener coalesced on the same source identifier receives a
/// clone of the same result, errors included.
pub type SourceResult = Result<Arc<Animation>, Arc<DecodeError>>;

type Listener = Box<dyn FnOnce(&SourceResult)>;

enum Entry {
    /// Bytes are being produced; waiters collect here
    Pending(Vec<Listener>),
    /// Last decode outcome, success or failure
    Ready(SourceResult),
}

/// In-process cache mapping source identifiers to decode results.
///
/// Concurrent requests for the same identifier are coalesced: only the
/// first requester fetches the bytes, and every waiter is notified
/// exactly once when [fulfill](struct.SourceCache.html#method.fulfill)
/// runs.  Results are stored last-write-wins, so a later failure for an
/// identifier replaces a cached success.
///
/// The cache is single-owner; wrap it in a `Mutex` when it must be
/// shared across threads.
#[derive(Default)]
pub struct SourceCache {
    entries: HashMap<String, Entry>,
}

impl SourceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in a source.
    ///
    /// Returns `true` when the caller must produce the bytes and call
    /// [fulfill](struct.SourceCache.html#method.fulfill); `false` when
    /// the listener was attached to an in-flight fetch or served
    /// immediately from the cache.
    pub fn request<F>(&mut self, src: &str, listener: F) -> bool
    where
        F: FnOnce(&SourceResult) + 'static,
    {
        match self.entries.get_mut(src) {
            None => {
                debug!("fetch needed: {}", src);
                self.entries.insert(
                    src.to_string(),
                    Entry::Pending(vec![Box::new(listener)]),
                );
                true
            }
            Some(Entry::Pending(waiters)) => {
                debug!("joined in-flight fetch: {}", src);
                waiters.push(Box::new(listener));
                false
            }
            Some(Entry::Ready(res)) => {
                listener(res);
                false
            }
        }
    }

    /// Deliver the bytes (or upstream failure) for a source.
    ///
    /// Sniffs the 4-byte magic, decodes, stores the result and drains
    /// any pending listeners.  Fulfilling an identifier that already
    /// has a result simply overwrites it.
    pub fn fulfill(
        &mut self,
        src: &str,
        bytes: Result<&[u8], DecodeError>,
    ) {
        let res: SourceResult = match bytes {
            Ok(b) if !is_gif(b) => Err(Arc::new(DecodeError::NotAGif)),
            Ok(b) => decode(b).map(Arc::new).map_err(Arc::new),
            Err(e) => Err(Arc::new(e)),
        };
        if let Err(ref e) = res {
            warn!("source {}: {}", src, e);
        }
        let prev = self
            .entries
            .insert(src.to_string(), Entry::Ready(res.clone()));
        if let Some(Entry::Pending(waiters)) = prev {
            for waiter in waiters {
                waiter(&res);
            }
        }
    }

    /// Look up the cached result for a source.
    pub fn get(&self, src: &str) -> Option<&SourceResult> {
        match self.entries.get(src) {
            Some(Entry::Ready(res)) => Some(res),
            _ => None,
        }
    }

    /// Drop a source from the cache.
    ///
    /// Pending waiters are discarded without notification; there is no
    /// cancellation signal for an in-flight fetch, whose later
    /// [fulfill](struct.SourceCache.html#method.fulfill) will simply
    /// repopulate the entry.
    pub fn forget(&mut self, src: &str) {
        self.entries.remove(src);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn counter() -> (Rc<RefCell<Vec<bool>>>, Rc<RefCell<Vec<bool>>>) {
        (Rc::new(RefCell::new(vec![])), Rc::new(RefCell::new(vec![])))
    }

    // a valid single-frame GIF stream
    const GIF: &[u8] = &[
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x02, 0x00,
        0x80, 0x01, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x2C,
        0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x02, 0x00, 0x00, 0x02,
        0x03, 0x0C, 0x10, 0x05, 0x00, 0x3B,
    ];

    #[test]
    fn coalesced_fetch() {
        let mut cache = SourceCache::new();
        let (a, b) = counter();
        let (a2, b2) = (Rc::clone(&a), Rc::clone(&b));
        // first requester fetches, second joins
        assert!(cache.request("x.gif", move |r| {
            a2.borrow_mut().push(r.is_ok());
        }));
        assert!(!cache.request("x.gif", move |r| {
            b2.borrow_mut().push(r.is_ok());
        }));
        cache.fulfill("x.gif", Ok(GIF));
        assert_eq!(*a.borrow(), [true]);
        assert_eq!(*b.borrow(), [true]);
        // later request is served from the cache without a fetch
        let (c, _) = counter();
        let c2 = Rc::clone(&c);
        assert!(!cache.request("x.gif", move |r| {
            c2.borrow_mut().push(r.is_ok());
        }));
        assert_eq!(*c.borrow(), [true]);
    }

    #[test]
    fn errors_reach_every_waiter() {
        let mut cache = SourceCache::new();
        let (a, b) = counter();
        let (a2, b2) = (Rc::clone(&a), Rc::clone(&b));
        cache.request("y.gif", move |r| {
            a2.borrow_mut().push(r.is_ok());
        });
        cache.request("y.gif", move |r| {
            b2.borrow_mut().push(r.is_ok());
        });
        cache.fulfill("y.gif", Ok(b"\x89PNG not a gif at all"));
        assert_eq!(*a.borrow(), [false]);
        assert_eq!(*b.borrow(), [false]);
        match cache.get("y.gif") {
            Some(Err(e)) => match **e {
                DecodeError::NotAGif => {}
                ref e => panic!("{:?}", e),
            },
            r => panic!("{:?}", r.is_some()),
        }
    }

    #[test]
    fn last_write_wins() {
        let mut cache = SourceCache::new();
        cache.request("z.gif", |_| {});
        cache.fulfill("z.gif", Ok(GIF));
        assert!(matches!(cache.get("z.gif"), Some(Ok(_))));
        // a fresh failure replaces the cached success
        cache.fulfill(
            "z.gif",
            Err(DecodeError::SourceResolution("404".to_string())),
        );
        assert!(matches!(cache.get("z.gif"), Some(Err(_))));
    }

    #[test]
    fn forget_discards_entry() {
        let mut cache = SourceCache::new();
        cache.request("w.gif", |_| {});
        cache.fulfill("w.gif", Ok(GIF));
        cache.forget("w.gif");
        assert!(cache.get("w.gif").is_none());
        // next request starts a fresh fetch
        assert!(cache.request("w.gif", |_| {}));
    }
}
