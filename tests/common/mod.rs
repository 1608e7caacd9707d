//! Shared fixtures for integration tests.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use dispatch_router::http::response;
use dispatch_router::routing::{Controller, ControllerRegistry};

/// Registry with the controllers the manifests below describe.
pub fn test_registry() -> Arc<ControllerRegistry> {
    Arc::new(
        ControllerRegistry::new()
            .register(
                Controller::new("TestController")
                    .action("index", &["limit", "offset", "slug"], |args: &[String]| {
                        // args arrive in declaration order
                        let (limit, offset, slug) = (&args[0], &args[1], &args[2]);
                        response::text(format!("{}-{}-{}", slug, limit, offset))
                    })
                    .action("about", &[], |_: &[String]| response::text("about"))
                    .action("internal", &[], |_: &[String]| response::text("internal")),
            )
            .register(
                Controller::new("BlogController")
                    .action("show", &["slug"], |args: &[String]| {
                        response::text(format!("post:{}", args[0]))
                    })
                    .action("latest", &[], |_: &[String]| response::text("latest")),
            ),
    )
}

/// Write the controller manifests used by the discovery tests into `dir`.
pub fn write_manifests(dir: &Path) {
    fs::create_dir_all(dir.join("admin")).unwrap();
    fs::write(
        dir.join("admin").join("TestController.toml"),
        r#"
prefix = "/admin"

[routes]
about = "/about"
index = { rule = "/page/{slug}/{limit}/{offset}", name = "homepage", requirements = { limit = "[0-9]+", offset = "[0-9]+" } }
"#,
    )
    .unwrap();

    fs::write(
        dir.join("BlogController.toml"),
        r#"
prefix = "/blog"

[routes]
show = { rule = "/{slug}" }
latest = { rule = "/latest", priority = 10 }
"#,
    )
    .unwrap();
}
