//! Narrow interfaces the resolver works through
//!
//! The resolver never sees a concrete request or router type. It reads one
//! header through [`HeaderSource`], rewrites the matched route through
//! [`RouteTarget`], asks [`HandlerExists`] whether a rewritten reference can
//! be dispatched, and records the outcome through [`VersionedRequest`].
//!
//! Implementations are provided for [`apiver_core::Request`] and for plain
//! `http::Request<B>` (route info and attributes carried as extensions).

use crate::version::{ResolvedVersion, VERSION_ATTRIBUTE};
use apiver_core::{Attributes, HandlerRegistry, Request, RouteInfo};
use std::collections::{BTreeSet, HashSet};

/// Read a named header
pub trait HeaderSource {
    /// Value of header `name`, if present and valid visible ASCII
    fn header(&self, name: &str) -> Option<&str>;
}

/// A route-resolution result whose handler reference can be rewritten
pub trait RouteTarget {
    fn is_matched(&self) -> bool;

    fn handler_ref(&self) -> &str;

    /// The reference the route was registered with, before any rewrite
    fn registered_ref(&self) -> &str {
        self.handler_ref()
    }

    fn set_handler_ref(&mut self, reference: String);
}

/// Whether a concrete handler reference can be dispatched
pub trait HandlerExists {
    fn handler_exists(&self, reference: &str) -> bool;
}

/// Everything the resolver needs from a request
pub trait VersionedRequest: HeaderSource {
    /// The matched route, if routing already happened
    fn route_target(&mut self) -> Option<&mut dyn RouteTarget>;

    /// Store the outcome: raw text under `__version`, typed value alongside
    fn record_version(&mut self, resolved: &ResolvedVersion);
}

impl RouteTarget for RouteInfo {
    fn is_matched(&self) -> bool {
        RouteInfo::is_matched(self)
    }

    fn handler_ref(&self) -> &str {
        self.uses()
    }

    fn registered_ref(&self) -> &str {
        self.registered()
    }

    fn set_handler_ref(&mut self, reference: String) {
        self.set_uses(reference);
    }
}

impl HandlerExists for HandlerRegistry {
    fn handler_exists(&self, reference: &str) -> bool {
        self.contains(reference)
    }
}

impl HandlerExists for HashSet<String> {
    fn handler_exists(&self, reference: &str) -> bool {
        self.contains(reference)
    }
}

impl HandlerExists for BTreeSet<String> {
    fn handler_exists(&self, reference: &str) -> bool {
        self.contains(reference)
    }
}

impl HandlerExists for [&str] {
    fn handler_exists(&self, reference: &str) -> bool {
        self.iter().any(|known| *known == reference)
    }
}

impl HeaderSource for Request {
    fn header(&self, name: &str) -> Option<&str> {
        Request::header(self, name)
    }
}

impl VersionedRequest for Request {
    fn route_target(&mut self) -> Option<&mut dyn RouteTarget> {
        self.route_mut().map(|route| route as &mut dyn RouteTarget)
    }

    fn record_version(&mut self, resolved: &ResolvedVersion) {
        self.attributes_mut()
            .insert(VERSION_ATTRIBUTE, resolved.version.clone());
        self.extensions_mut().insert(resolved.clone());
    }
}

impl<B> HeaderSource for http::Request<B> {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|v| v.to_str().ok())
    }
}

impl<B> VersionedRequest for http::Request<B> {
    fn route_target(&mut self) -> Option<&mut dyn RouteTarget> {
        self.extensions_mut()
            .get_mut::<RouteInfo>()
            .map(|route| route as &mut dyn RouteTarget)
    }

    fn record_version(&mut self, resolved: &ResolvedVersion) {
        let extensions = self.extensions_mut();
        match extensions.get_mut::<Attributes>() {
            Some(attributes) => {
                attributes.insert(VERSION_ATTRIBUTE, resolved.version.clone());
            }
            None => {
                let mut attributes = Attributes::new();
                attributes.insert(VERSION_ATTRIBUTE, resolved.version.clone());
                extensions.insert(attributes);
            }
        }
        extensions.insert(resolved.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_route_info_as_route_target() {
        let mut route = RouteInfo::new(r"Ctrl\V{d}\Foo@bar");
        let target: &mut dyn RouteTarget = &mut route;

        assert!(target.is_matched());
        target.set_handler_ref(r"Ctrl\V2\Foo@bar".to_string());
        assert_eq!(target.registered_ref(), r"Ctrl\V{d}\Foo@bar");
        assert_eq!(route.uses(), r"Ctrl\V2\Foo@bar");
    }

    #[test]
    fn test_handler_exists_impls() {
        let set: HashSet<String> = [r"Ctrl\V1\Foo@bar".to_string()].into_iter().collect();
        assert!(set.handler_exists(r"Ctrl\V1\Foo@bar"));
        assert!(!set.handler_exists(r"Ctrl\V2\Foo@bar"));

        let list: &[&str] = &[r"Ctrl\V1\Foo@bar", r"Ctrl\V2\Foo@bar"];
        assert!(list.handler_exists(r"Ctrl\V2\Foo@bar"));
    }

    #[test]
    fn test_http_request_records_into_extensions() {
        let mut req = http::Request::builder()
            .header("accept", "application/vnd.api-v2+json")
            .body(Bytes::new())
            .unwrap();
        req.extensions_mut().insert(RouteInfo::new(r"Ctrl\V{d}\Foo@bar"));

        assert_eq!(
            HeaderSource::header(&req, "Accept"),
            Some("application/vnd.api-v2+json")
        );
        assert!(req.route_target().is_some());

        req.record_version(&ResolvedVersion::accepted("2", 2));
        let attributes = req.extensions().get::<Attributes>().unwrap();
        assert_eq!(attributes.get(VERSION_ATTRIBUTE), Some("2"));
        assert_eq!(
            req.extensions().get::<ResolvedVersion>(),
            Some(&ResolvedVersion::accepted("2", 2))
        );
    }

    #[test]
    fn test_core_request_records_attribute_and_extension() {
        let mut req: Request = http::Request::builder()
            .body(Bytes::new())
            .unwrap()
            .into();

        req.record_version(&ResolvedVersion::accepted("1a", 1));
        assert_eq!(req.attribute(VERSION_ATTRIBUTE), Some("1a"));
        assert_eq!(
            req.extensions().get::<ResolvedVersion>().unwrap().major,
            Some(1)
        );
    }
}
