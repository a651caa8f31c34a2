//! End-to-end rendering against the in-memory store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tessera_render::{FilterRegistry, Paginator, RenderError, Renderer, SiteBuilder, write};
use tessera_store::{Layout, MemorySink, MemoryStore, Page, Partial, ResourceKind, ResourceStore};

fn filters() -> Arc<FilterRegistry> {
    Arc::new(FilterRegistry::with_builtins())
}

fn wrapping_layout(name: &str, outer: Option<&str>) -> Layout {
    let layout = Layout::new(format!("layouts/{name}.html")).with_filters(["template"]);
    match outer {
        Some(outer) => layout.with_layout(outer),
        None => layout,
    }
}

#[test]
fn acyclic_chain_splices_content_outward() {
    let page = Page::new("index.md").with_layout("inner");
    let store = MemoryStore::new()
        .with_page(page.clone(), "page")
        .with_layout(wrapping_layout("inner", Some("middle")), "<i>{{ content }}</i>")
        .with_layout(wrapping_layout("middle", Some("outer")), "<m>{{ content }}</m>")
        .with_layout(wrapping_layout("outer", None), "<o>{{ content }}</o>");

    let renderer = Renderer::new(page, Arc::new(store), filters()).unwrap();

    assert_eq!(renderer.layout_page().unwrap(), "<o><m><i>page</i></m></o>");
}

#[test]
fn two_layout_cycle_fails_and_leaves_no_output() {
    let page = Page::new("index.md").with_layout("a");
    let store = MemoryStore::new()
        .with_page(page.clone(), "x")
        .with_layout(wrapping_layout("a", Some("b")), "{{ content }}")
        .with_layout(wrapping_layout("b", Some("a")), "{{ content }}");
    let sink = MemorySink::new();

    let err = write(page, Arc::new(store), filters(), &sink).unwrap_err();

    assert!(matches!(err, RenderError::RenderingLoopDetected { ref path, .. } if path == Path::new("layouts/a.html")));
    assert!(err.to_string().starts_with("rendering loop detected for 'layouts/a.html'"));
    assert!(sink.is_empty());
}

#[test]
fn renders_are_independent_after_a_loop() {
    let looping = Page::new("loop.md").with_layout("a");
    let plain = Page::new("plain.md").with_layout("b");
    let store: Arc<dyn ResourceStore> = Arc::new(
        MemoryStore::new()
            .with_page(looping.clone(), "x")
            .with_page(plain.clone(), "y")
            .with_layout(wrapping_layout("a", Some("a")), "{{ content }}")
            .with_layout(wrapping_layout("b", None), "[{{ content }}]"),
    );

    let first = Renderer::new(looping, Arc::clone(&store), filters()).unwrap();
    assert!(first.layout_page().unwrap_err().is_loop_detected());

    // A leftover entry from the failed render would make this one fail.
    let second = Renderer::new(plain, store, filters()).unwrap();
    assert_eq!(second.layout_page().unwrap(), "[y]");
}

#[test]
fn partial_rendering_itself_is_detected() {
    let page = Page::new("index.md").with_filters(["template"]);
    let store = MemoryStore::new()
        .with_page(page.clone(), "{{ render_partial('echo') }}")
        .with_partial(
            Partial::new("_echo.html").with_filters(["template"]),
            "again: {{ render_partial('echo') }}",
        );

    let renderer = Renderer::new(page, Arc::new(store), filters()).unwrap();
    let err = renderer.layout_page().unwrap_err();

    assert!(err.is_loop_detected());
    match err.innermost() {
        RenderError::RenderingLoopDetected { path, stack } => {
            assert_eq!(path, &PathBuf::from("_echo.html"));
            assert_eq!(
                stack,
                &vec![PathBuf::from("index.md"), PathBuf::from("_echo.html")]
            );
        }
        other => panic!("expected loop, got {other:?}"),
    }
}

#[test]
fn same_partial_twice_in_sequence_is_not_a_loop() {
    let page = Page::new("index.md").with_filters(["template"]);
    let store = MemoryStore::new()
        .with_page(page.clone(), "{{ render_partial('hr') }}{{ render_partial('hr') }}")
        .with_partial(Partial::new("_hr.html"), "<hr>");

    let renderer = Renderer::new(page, Arc::new(store), filters()).unwrap();

    assert_eq!(renderer.layout_page().unwrap(), "<hr><hr>");
}

#[test]
fn paginated_page_writes_one_file_per_window() {
    let page = Page::new("blog/index.md")
        .with_layout("list")
        .with_filters(["template"]);
    let body = "{% for n in paginate([0, 1, 2, 3, 4, 5, 6, 7, 8, 9], 3) %}{{ n }},{% endfor %}";
    let layout_body = "{{ content }}#{{ pager().number }}\
                       {% if pager().has_next %}>{{ pager().next_url }}{% endif %}";
    let store = MemoryStore::new()
        .with_page(page.clone(), body)
        .with_layout(wrapping_layout("list", None), layout_body);
    let sink = MemorySink::new();

    let report = write(page, Arc::new(store), filters(), &sink).unwrap();

    assert_eq!(
        report.destinations,
        vec![
            PathBuf::from("blog/index.html"),
            PathBuf::from("blog/index2.html"),
            PathBuf::from("blog/index3.html"),
            PathBuf::from("blog/index4.html"),
        ]
    );
    assert_eq!(sink.len(), 4);
    assert_eq!(sink.get("blog/index.html").as_deref(), Some("0,1,2,#1>index2.html"));
    assert_eq!(sink.get("blog/index2.html").as_deref(), Some("3,4,5,#2>index3.html"));
    assert_eq!(sink.get("blog/index3.html").as_deref(), Some("6,7,8,#3>index4.html"));
    assert_eq!(sink.get("blog/index4.html").as_deref(), Some("9,#4"));
}

#[test]
fn window_boundaries_for_ten_by_three() {
    let windows: Vec<_> = Paginator::new(10, 3, "index.md").unwrap().windows().collect();

    assert_eq!(
        windows.iter().map(|w| (w.range(), w.has_next())).collect::<Vec<_>>(),
        vec![(0..3, true), (3..6, true), (6..9, true), (9..10, false)]
    );
}

#[test]
fn directory_local_partial_wins_over_global() {
    let page = Page::new("blog/post.md").with_filters(["template"]);
    let store = MemoryStore::new()
        .with_page(page.clone(), "{{ render_partial('sidebar') }}")
        .with_partial(Partial::new("_sidebar.html"), "global")
        .with_partial(Partial::new("blog/_sidebar.html"), "local");

    let renderer = Renderer::new(page, Arc::new(store), filters()).unwrap();

    assert_eq!(renderer.layout_page().unwrap(), "local");
}

#[test]
fn global_partial_used_when_no_local_one() {
    let page = Page::new("docs/guide.md").with_filters(["template"]);
    let store = MemoryStore::new()
        .with_page(page.clone(), "{{ render_partial('sidebar') }}")
        .with_partial(Partial::new("_sidebar.html"), "global")
        .with_partial(Partial::new("blog/_sidebar.html"), "local");

    let renderer = Renderer::new(page, Arc::new(store), filters()).unwrap();

    assert_eq!(renderer.layout_page().unwrap(), "global");
}

#[test]
fn non_page_resources_are_rejected_without_writing() {
    let sink = MemorySink::new();
    let store: Arc<dyn ResourceStore> = Arc::new(MemoryStore::new());

    let layout_err = write(Layout::new("layouts/default.html"), Arc::clone(&store), filters(), &sink)
        .unwrap_err();
    let partial_err = write(Partial::new("_nav.html"), store, filters(), &sink).unwrap_err();

    assert!(matches!(
        layout_err,
        RenderError::InvalidResourceKind { kind: ResourceKind::Layout, .. }
    ));
    assert!(matches!(
        partial_err,
        RenderError::InvalidResourceKind { kind: ResourceKind::Partial, .. }
    ));
    assert!(sink.is_empty());
}

#[test]
fn unpaginated_page_writes_exactly_once() {
    let page = Page::new("about.md").with_filters(["markdown"]);
    let store = MemoryStore::new().with_page(page.clone(), "*about*");
    let sink = MemorySink::new();

    let report = write(page, Arc::new(store), filters(), &sink).unwrap();

    assert_eq!(report.destinations, vec![PathBuf::from("about.html")]);
    assert_eq!(sink.writes(), vec![(PathBuf::from("about.html"), "<p><em>about</em></p>\n".to_owned())]);
}

#[test]
fn site_build_reports_every_page() {
    let store = MemoryStore::new()
        .with_page(Page::new("index.md").with_layout("base"), "home")
        .with_page(Page::new("broken.md").with_filters(["textile"]), "x")
        .with_page(Page::new("docs/intro.md").with_layout("base"), "intro")
        .with_layout(wrapping_layout("base", None), "<html>{{ content }}</html>");
    let sink = MemorySink::new();

    let report = SiteBuilder::new(Arc::new(store)).build(&sink);

    assert_eq!(report.files_written(), 2);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        RenderError::UnknownFilter { ref name, .. } if name == "textile"
    ));
    assert_eq!(sink.get("index.html").as_deref(), Some("<html>home</html>"));
    assert_eq!(sink.get("docs/intro.html").as_deref(), Some("<html>intro</html>"));
}
