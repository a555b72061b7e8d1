//! End-to-end stage tests over a temporary project.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::*;
use crate::config::{PipelineConfig, Preprocessor};
use crate::image::raster::tests::sample_png;
use crate::transform::global_bindings;

const ICON_SVG: &str = r#"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" viewBox="0 0 16 16">
    <!-- drawn by hand -->
    <rect id="dot" x="4" y="4" width="8" height="8" fill="blue"/>
</svg>
"#;

fn write(root: &Path, rel: &str, content: impl AsRef<[u8]>) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A project using the built-in CSS preprocessor, so no Sass install is needed.
fn project() -> (TempDir, StageContext) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "src/index.html", "<html><body><h1>hi</h1></body></html>");
    write(root, "src/about.html", "<html><body>about</body></html>");
    write(root, "src/scss/main.scss", ".a {\n  color: red;\n}\n");
    write(root, "src/scss/_vars.scss", ".partial { color: blue; }");
    write(root, "src/js/main.js", "var x = 1;\n");
    write(root, "src/js/lib/util.js", "var y = 2;\n");
    write(root, "src/img/logo.png", sample_png(24, 24));
    write(root, "src/img/icons/dot.svg", ICON_SVG);
    write(root, "src/img/readme.txt", "not an image");
    write(root, "src/fonts/body.woff2", b"wOF2 fake font");

    let mut config = PipelineConfig {
        root: root.to_path_buf(),
        ..PipelineConfig::default()
    };
    config.styles.preprocessor = Preprocessor::Css;
    let ctx = StageContext::new(config);
    (dir, ctx)
}

/// Relative path -> content of every file under `dir`.
fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(base: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(base, &path, out);
            } else {
                let rel = path.strip_prefix(base).unwrap().to_path_buf();
                out.insert(rel, fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(dir, dir, &mut out);
    out
}

fn read_string(path: PathBuf) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_stage_names_round_trip() {
    for stage in StageId::ALL {
        assert_eq!(stage.name().parse::<StageId>(), Ok(stage));
    }
    assert_eq!(
        "styles:dev".parse::<StageId>(),
        Err(UnknownStage("styles:dev".into()))
    );
}

#[test]
fn test_build_is_reproducible_and_removes_stale_files() {
    let (_dir, ctx) = project();
    let dist = ctx.layout.dist();

    run_target(StageId::Build, &ctx).unwrap();
    let first = snapshot(&dist);

    write(&dist, "stale/old.css", "left over");
    write(&dist, "removed.html", "gone");

    run_target(StageId::Build, &ctx).unwrap();
    let second = snapshot(&dist);

    assert_eq!(first, second);
    assert!(!dist.join("stale").exists());
    assert!(!dist.join("removed.html").exists());

    let files: Vec<_> = second.keys().map(|p| p.to_string_lossy().replace('\\', "/")).collect();
    assert_eq!(
        files,
        vec![
            "about.html",
            "css/style.css",
            "fonts/body.woff2",
            "img/icons/dot.svg",
            "img/logo.png",
            "index.html",
            "js/lib/util.js",
            "js/main.js",
            "js/main.min.js",
        ]
    );
}

#[test]
fn test_second_copy_writes_nothing() {
    let (_dir, ctx) = project();

    let first = run_stage(StageId::Copy, &ctx).unwrap();
    assert_eq!(first.written.len(), 10);
    assert_eq!(first.skipped, 0);

    let second = run_stage(StageId::Copy, &ctx).unwrap();
    assert!(second.written.is_empty());
    assert_eq!(second.skipped, 10);
}

#[test]
fn test_copy_picks_up_edits() {
    let (_dir, ctx) = project();
    run_stage(StageId::Copy, &ctx).unwrap();

    std::thread::sleep(std::time::Duration::from_millis(20));
    write(ctx.layout.root(), "src/index.html", "<html><body>changed</body></html>");

    let report = run_stage(StageId::Copy, &ctx).unwrap();
    assert_eq!(report.written, vec![ctx.layout.staging().join("index.html")]);
    assert_eq!(
        read_string(ctx.layout.staging().join("index.html")),
        "<html><body>changed</body></html>"
    );
}

#[test]
fn test_scripts_build_bundle() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/js/a.js", "var x=1;");
    write(dir.path(), "src/js/b.js", "var y=2;");
    let ctx = StageContext::new(PipelineConfig {
        root: dir.path().to_path_buf(),
        ..PipelineConfig::default()
    });

    let report = run_stage(StageId::ScriptsBuild, &ctx).unwrap();
    assert_eq!(report.written.len(), 3);

    let js = ctx.layout.dist().join("js");
    assert_eq!(fs::read(js.join("a.js")).unwrap(), b"var x=1;");
    assert_eq!(fs::read(js.join("b.js")).unwrap(), b"var y=2;");

    let bundle = read_string(js.join("main.min.js"));
    assert_eq!(global_bindings(&bundle), ["x", "y"], "got {bundle}");
}

#[test]
fn test_scripts_build_bundle_keeps_unused_globals() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/js/a.js", "function helper(v) { return v + 1; }");
    write(dir.path(), "src/js/b.js", "var count = 0;");
    write(dir.path(), "src/js/c.js", "var z = helper(2);");
    let ctx = StageContext::new(PipelineConfig {
        root: dir.path().to_path_buf(),
        ..PipelineConfig::default()
    });

    run_stage(StageId::ScriptsBuild, &ctx).unwrap();

    let bundle = read_string(ctx.layout.dist().join("js/main.min.js"));
    assert_eq!(global_bindings(&bundle), ["helper", "count", "z"], "got {bundle}");
}

#[test]
fn test_scripts_dev_passes_entry_only() {
    let (_dir, ctx) = project();
    let report = run_stage(StageId::Scripts, &ctx).unwrap();
    let js = ctx.layout.staging().join("js");
    assert_eq!(report.written, vec![js.join("main.js")]);
    assert_eq!(read_string(js.join("main.js")), "var x = 1;\n");
    assert!(!js.join("lib").exists());
}

#[test]
fn test_scripts_missing_sources_write_nothing() {
    let dir = TempDir::new().unwrap();
    let ctx = StageContext::new(PipelineConfig {
        root: dir.path().to_path_buf(),
        ..PipelineConfig::default()
    });
    assert!(run_stage(StageId::Scripts, &ctx).unwrap().written.is_empty());
    assert!(run_stage(StageId::ScriptsBuild, &ctx).unwrap().written.is_empty());
    assert!(run_stage(StageId::Styles, &ctx).unwrap().written.is_empty());
    assert!(!ctx.layout.dist().exists());
}

#[test]
fn test_styles_build_minified() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/scss/main.scss", ".a{color:red}");
    let mut config = PipelineConfig {
        root: dir.path().to_path_buf(),
        ..PipelineConfig::default()
    };
    config.styles.preprocessor = Preprocessor::Css;
    let ctx = StageContext::new(config);

    let report = run_stage(StageId::StylesBuild, &ctx).unwrap();
    let path = ctx.layout.dist().join("css/style.css");
    assert_eq!(report.written, vec![path.clone()]);

    let css = read_string(path);
    assert!(css.contains(".a"));
    assert!(css.contains("color:red"));
    assert!(!css.contains('\n'));
    assert!(!css.contains(' '));
}

#[test]
fn test_styles_joins_sources_and_skips_partials() {
    let (_dir, ctx) = project();
    write(ctx.layout.root(), "src/scss/extra.scss", ".b { color: green; }");

    run_stage(StageId::Styles, &ctx).unwrap();
    let css = read_string(ctx.layout.staging().join("css/style.css"));

    let a = css.find(".a").unwrap();
    let b = css.find(".b").unwrap();
    assert!(b < a, "extra.scss sorts before main.scss");
    assert!(!css.contains(".partial"));
}

#[test]
fn test_styles_error_writes_nothing() {
    let (_dir, ctx) = project();
    write(ctx.layout.root(), "src/scss/main.scss", "..broken { color: red }");

    let err = run_stage(StageId::Styles, &ctx).unwrap_err();
    let transform = err.downcast_ref::<crate::transform::TransformError>().unwrap();
    assert_eq!(transform.transform, "css");
    assert!(!ctx.layout.staging().join("css/style.css").exists());
}

#[test]
fn test_images_never_upsize() {
    let (_dir, ctx) = project();
    run_stage(StageId::Images, &ctx).unwrap();
    run_stage(StageId::ImagesBuild, &ctx).unwrap();

    for rel in ["logo.png", "icons/dot.svg"] {
        let source = fs::metadata(ctx.layout.source().join("img").join(rel)).unwrap().len();
        for tree in [ctx.layout.staging(), ctx.layout.dist()] {
            let out = fs::metadata(tree.join("img").join(rel)).unwrap().len();
            assert!(out <= source, "{rel}: {out} > {source}");
        }
    }
    assert!(!ctx.layout.staging().join("img/readme.txt").exists());
}

#[test]
fn test_images_dev_skips_unchanged() {
    let (_dir, ctx) = project();
    let first = run_stage(StageId::Images, &ctx).unwrap();
    assert_eq!(first.written.len(), 2);

    let second = run_stage(StageId::Images, &ctx).unwrap();
    assert!(second.written.is_empty());
    assert_eq!(second.skipped, 2);
}

#[test]
fn test_staging_tree_regenerates() {
    let (_dir, ctx) = project();
    let dev = [StageId::Copy, StageId::Styles, StageId::Scripts, StageId::Images];

    for stage in dev {
        run_stage(stage, &ctx).unwrap();
    }
    let first = snapshot(&ctx.layout.staging());

    fs::remove_dir_all(ctx.layout.staging()).unwrap();
    for stage in dev {
        run_stage(stage, &ctx).unwrap();
    }
    let second = snapshot(&ctx.layout.staging());

    assert_eq!(first, second);
    assert!(second.contains_key(Path::new("css/style.css")));
}

#[test]
fn test_clean_stage_keeps_directory() {
    let (_dir, ctx) = project();
    run_stage(StageId::Copy, &ctx).unwrap();
    run_stage(StageId::Clean, &ctx).unwrap();

    assert!(ctx.layout.staging().is_dir());
    assert!(snapshot(&ctx.layout.staging()).is_empty());
    assert!(ctx.layout.source().join("index.html").exists());
}

#[test]
fn test_build_failure_skips_aggregate_but_runs_siblings() {
    let (_dir, ctx) = project();
    write(ctx.layout.root(), "src/js/broken.js", "function (");

    let err = run_target(StageId::Build, &ctx).unwrap_err();
    assert!(err.to_string().contains("scripts:build"));

    let dist = ctx.layout.dist();
    assert!(dist.join("css/style.css").exists());
    assert!(dist.join("index.html").exists());
    assert!(!dist.join("js/main.min.js").exists());

    let summary = runner::execute(&StageGraph::standard(), StageId::Build, &ctx).unwrap();
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.skipped, vec![StageId::Build]);
    assert!(!summary.is_success());
}
