use crate::error::{ForgeError, Result};
use crate::openapi::OpenApiDocument;
use crate::template::{TemplateKind, TemplateStore};
use serde::Serialize;
use std::collections::HashMap;

pub const HEALTH_PATH: &str = "/health";
pub const NOT_IMPLEMENTED_HANDLER: &str = "handler.not_implemented";

/// One generated route: a document operation and the function name it is
/// deployed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    pub path: String,
    pub method: String,
    pub handler_name: String,
}

/// Everything route scaffolding derives from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteScaffold {
    pub handler_source: String,
    /// Function entries to splice into the deployment manifest, after the
    /// built-in health function.
    pub manifest_fragment: String,
    pub routes: Vec<RouteDescriptor>,
    /// `"METHOD path"` for every operation in the document.
    pub route_summary: Vec<String>,
}

/// `/alerts/{id}` → `alerts_id`, `/` → `root`.
pub fn slugify(path: &str) -> String {
    let slug = path
        .trim_matches('/')
        .replace('/', "_")
        .replace(['{', '}'], "");
    if slug.is_empty() {
        "root".to_string()
    } else {
        slug
    }
}

pub fn handler_name(method: &str, path: &str) -> String {
    format!("{}_{}", method.to_ascii_lowercase(), slugify(path))
}

/// Derive route descriptors for every operation except the literal health
/// path, which the manifest template already covers.
///
/// Fails if two operations would be deployed under the same function name
/// (e.g. `GET /a/b` and `GET /a_b`).
pub fn route_descriptors(doc: &OpenApiDocument) -> Result<Vec<RouteDescriptor>> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut routes = Vec::new();
    for (path, method) in doc.operations() {
        if path == HEALTH_PATH {
            continue;
        }
        let name = handler_name(method, path);
        if let Some(first) = seen.get(&name) {
            return Err(ForgeError::HandlerCollision {
                name,
                first: first.clone(),
                second: format!("{} {path}", method.to_ascii_uppercase()),
            });
        }
        seen.insert(name.clone(), format!("{} {path}", method.to_ascii_uppercase()));
        routes.push(RouteDescriptor {
            path: path.to_string(),
            method: method.to_ascii_lowercase(),
            handler_name: name,
        });
    }
    Ok(routes)
}

pub fn manifest_fragment(routes: &[RouteDescriptor], base_path: &str) -> String {
    let mut lines = Vec::new();
    for r in routes {
        lines.push(format!("  {}:", r.handler_name));
        lines.push(format!("    handler: {NOT_IMPLEMENTED_HANDLER}"));
        lines.push("    events:".to_string());
        lines.push("      - http:".to_string());
        lines.push(format!("          path: {base_path}{}", r.path));
        lines.push(format!("          method: {}", r.method));
    }
    if lines.is_empty() {
        String::new()
    } else {
        lines.join("\n") + "\n"
    }
}

pub fn route_summary(doc: &OpenApiDocument) -> Vec<String> {
    doc.operations()
        .map(|(path, method)| format!("{} {path}", method.to_ascii_uppercase()))
        .collect()
}

pub fn scaffold(
    doc: &OpenApiDocument,
    base_path: &str,
    templates: &TemplateStore,
) -> Result<RouteScaffold> {
    let routes = route_descriptors(doc)?;
    Ok(RouteScaffold {
        handler_source: templates.load(TemplateKind::Handler)?.text,
        manifest_fragment: manifest_fragment(&routes, base_path),
        route_summary: route_summary(doc),
        routes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> OpenApiDocument {
        OpenApiDocument::parse(yaml).unwrap()
    }

    #[test]
    fn slugify_examples() {
        assert_eq!(slugify("/alerts/{id}"), "alerts_id");
        assert_eq!(slugify("/"), "root");
        assert_eq!(slugify(""), "root");
        assert_eq!(slugify("/users/{userId}/alerts/"), "users_userId_alerts");
    }

    #[test]
    fn handler_names_lowercase_method() {
        assert_eq!(handler_name("PATCH", "/alerts/{id}"), "patch_alerts_id");
        assert_eq!(handler_name("get", "/"), "get_root");
    }

    #[test]
    fn alerts_document_yields_three_routes() {
        let d = doc(
            "paths:\n  /alerts:\n    get: {}\n    post: {}\n  /alerts/{id}:\n    patch: {}\n",
        );
        let s = scaffold(&d, "/api", &TemplateStore::builtin()).unwrap();
        let names: Vec<_> = s.routes.iter().map(|r| r.handler_name.as_str()).collect();
        assert_eq!(names, vec!["get_alerts", "post_alerts", "patch_alerts_id"]);
        assert!(s.manifest_fragment.contains("  get_alerts:\n    handler: handler.not_implemented"));
        assert!(s.manifest_fragment.contains("          path: /api/alerts/{id}\n          method: patch"));
        assert_eq!(
            s.route_summary,
            vec!["GET /alerts", "POST /alerts", "PATCH /alerts/{id}"]
        );
    }

    #[test]
    fn health_path_is_skipped_but_summarized() {
        let d = doc("paths:\n  /health:\n    get: {}\n  /alerts:\n    get: {}\n");
        let routes = route_descriptors(&d).unwrap();
        assert_eq!(routes.len(), 1);
        assert!(!manifest_fragment(&routes, "/api").contains("health"));
        assert_eq!(route_summary(&d), vec!["GET /health", "GET /alerts"]);
    }

    #[test]
    fn collision_fails_fast() {
        let d = doc("paths:\n  /a/b:\n    get: {}\n  /a_b:\n    get: {}\n");
        let err = route_descriptors(&d).unwrap_err();
        match err {
            ForgeError::HandlerCollision { name, first, second } => {
                assert_eq!(name, "get_a_b");
                assert_eq!(first, "GET /a/b");
                assert_eq!(second, "GET /a_b");
            }
            other => panic!("expected HandlerCollision, got {other:?}"),
        }
    }

    #[test]
    fn same_slug_different_methods_do_not_collide() {
        let d = doc("paths:\n  /a/b:\n    get: {}\n  /a_b:\n    post: {}\n");
        assert_eq!(route_descriptors(&d).unwrap().len(), 2);
    }

    #[test]
    fn empty_document_has_empty_fragment() {
        let d = doc("openapi: 3.0.3\n");
        let s = scaffold(&d, "/api", &TemplateStore::builtin()).unwrap();
        assert!(s.manifest_fragment.is_empty());
        assert!(s.handler_source.contains("def health(event, context):"));
        assert!(s.handler_source.contains("def not_implemented(event, context):"));
    }
}
