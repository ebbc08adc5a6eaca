/*
 * cli_tests.rs
 * Copyright (c) 2025 Yivic
 *
 * End-to-end tests for the yivic binary.
 */

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

struct Themes {
    _dir: tempfile::TempDir,
    child: String,
    parent: String,
}

impl Themes {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let child = dir.path().join("child");
        let parent = dir.path().join("parent");
        fs::create_dir_all(child.join("resources/views")).unwrap();
        fs::create_dir_all(parent.join("resources/views")).unwrap();
        Self {
            child: child.to_string_lossy().into_owned(),
            parent: parent.to_string_lossy().into_owned(),
            _dir: dir,
        }
    }

    fn write(root: &str, relative: &str, contents: &str) {
        let path = Path::new(root).join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_yivic"))
            .args([
                "--base-path",
                &self.child,
                "--base-url",
                "https://x/child",
                "--parent-path",
                &self.parent,
                "--parent-url",
                "https://x/parent",
            ])
            .args(args)
            .output()
            .unwrap()
    }

    fn stdout(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "yivic {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }
}

#[test]
fn test_asset_prefers_child_then_parent() {
    let themes = Themes::new();
    Themes::write(&themes.parent, "images/logo.png", "p");
    Themes::write(&themes.parent, "images/icon.png", "p");
    Themes::write(&themes.child, "images/icon.png", "c");

    assert_eq!(
        themes.stdout(&["asset", "images/logo.png"]),
        "https://x/parent/images/logo.png\n"
    );
    assert_eq!(
        themes.stdout(&["asset", "images/icon.png"]),
        "https://x/child/images/icon.png\n"
    );
    assert_eq!(
        themes.stdout(&["asset", "../secret.txt"]),
        "https://x/child\n"
    );
}

#[test]
fn test_mix_reads_manifest() {
    let themes = Themes::new();
    Themes::write(
        &themes.child,
        "public-assets/dist/manifest.json",
        r#"{"/css/main.css": "/css/main.ab12cd34.css"}"#,
    );
    Themes::write(&themes.child, "public-assets/dist/css/main.ab12cd34.css", "");

    assert_eq!(
        themes.stdout(&["mix", "css/main.css"]),
        "https://x/child/public-assets/dist/css/main.ab12cd34.css\n"
    );
    // Unknown manifest location: unhashed fallback.
    assert_eq!(
        themes.stdout(&["mix", "css/main.css", "--manifest", "nope.json"]),
        "https://x/child/public-assets/dist/css/main.css\n"
    );
}

#[test]
fn test_views_and_find_view() {
    let themes = Themes::new();
    Themes::write(&themes.parent, "resources/views/partials/footer.blade.php", "parent footer");
    Themes::write(&themes.child, "resources/views/partials/header.php", "child header");

    assert_eq!(
        themes.stdout(&["views"]),
        format!(
            "{}/resources/views\n{}/resources/views\n",
            themes.child, themes.parent
        )
    );
    assert_eq!(
        themes.stdout(&["find-view", "partials.footer"]),
        format!("{}/resources/views/partials/footer.blade.php\n", themes.parent)
    );
    assert_eq!(themes.stdout(&["render", "partials.header"]), "child header");

    let missing = themes.run(&["find-view", "partials.sidebar"]);
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("partials.sidebar"));
}

#[test]
fn test_ensure_compiled_creates_directory() {
    let themes = Themes::new();
    let expected = format!("{}/storage/framework/views", themes.child);

    assert_eq!(themes.stdout(&["compiled-path"]), format!("{expected}\n"));
    assert_eq!(themes.stdout(&["ensure-compiled"]), format!("{expected}\n"));
    assert!(Path::new(&expected).is_dir());
}

#[test]
fn test_config_merges_files_and_overrides() {
    let themes = Themes::new();
    Themes::write(
        &themes.child,
        "wp-app-config/app.json",
        r#"{"themeSlug": "acme", "env": "staging"}"#,
    );

    let slug = themes.stdout(&["config", "themeSlug"]);
    assert_eq!(slug.trim(), "\"acme\"");

    let env = themes.stdout(&["--set", "env=local", "config", "env"]);
    assert_eq!(env.trim(), "\"local\"");

    let missing = themes.stdout(&["config", "nope"]);
    assert_eq!(missing.trim(), "null");

    let context: serde_json::Value =
        serde_json::from_str(&themes.stdout(&["--set", "debug=true", "context"])).unwrap();
    assert_eq!(context["slug"], "acme");
    assert_eq!(context["debug"], true);
    assert_eq!(context["parentBaseUrl"], "https://x/parent");
}

#[test]
fn test_missing_base_path_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_yivic"))
        .args(["views"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--base-path"));
}
