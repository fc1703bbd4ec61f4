use http::header::VARY;
use http::{HeaderMap, HeaderName, HeaderValue};

/// Ordered header writes produced by one evaluation.
///
/// `Vary` entries are appended as separate values; everything else overwrites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsHeaders {
    vary: Vec<HeaderValue>,
    set: Vec<(HeaderName, HeaderValue)>,
}

impl CorsHeaders {
    pub(crate) fn vary(&mut self, name: &'static str) {
        self.vary.push(HeaderValue::from_static(name));
    }

    pub(crate) fn set(&mut self, name: HeaderName, value: HeaderValue) {
        self.set.push((name, value));
    }

    /// Values appended to `Vary`, in order.
    pub fn vary_values(&self) -> &[HeaderValue] {
        &self.vary
    }

    /// Last value written for `name`, if any.
    pub fn get(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.set.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Write into a response header map.
    pub fn apply(self, headers: &mut HeaderMap) {
        for value in self.vary {
            headers.append(VARY, value);
        }
        for (name, value) in self.set {
            headers.insert(name, value);
        }
    }

    /// Write underneath headers a downstream handler already produced.
    ///
    /// Result matches writing these headers before the handler ran: our `Vary`
    /// values come first, and any other header the handler set replaces ours.
    pub fn apply_under(self, headers: &mut HeaderMap) {
        let mut merged = HeaderMap::with_capacity(headers.len() + self.vary.len() + self.set.len());
        self.apply(&mut merged);

        let mut current: Option<HeaderName> = None;
        for (name, value) in std::mem::take(headers) {
            match name {
                Some(name) => {
                    if name == VARY {
                        merged.append(&name, value);
                    } else {
                        merged.insert(&name, value);
                    }
                    current = Some(name);
                }
                // Further values of a multi-valued header.
                None => {
                    if let Some(name) = &current {
                        merged.append(name, value);
                    }
                }
            }
        }
        *headers = merged;
    }
}
