//! Template evaluation with minijinja.
//!
//! Bodies are evaluated with auto-escaping off. The template sees:
//!
//! - `content`: the content slot (what a layout wraps), or none
//! - `page`: the page being rendered (`path`, `destination`, `title`,
//!   `number`, `vars`)
//!
//! and these functions:
//!
//! - `render_partial(name)`: render a partial through its own filters
//! - `paginate(items, per_page)`: the current window's share of `items`
//! - `pager()`: the current window, or none if the page doesn't paginate
//! - `h(text)`: HTML-escape `text` (also available as the `h` filter)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, ErrorKind, Value, context};
use serde::Serialize;

use crate::context::{RenderContext, escape_html};
use crate::error::RenderError;
use crate::filters::Filter;
use crate::paginate::Pager;

/// Name used for templates evaluated outside any resource.
const INLINE_TEMPLATE: &str = "<inline>";

/// Evaluates a body as a minijinja template.
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateFilter;

impl Filter for TemplateFilter {
    fn apply(&self, input: &str, cx: &RenderContext) -> Result<String, RenderError> {
        let path = cx
            .stack()
            .current()
            .unwrap_or_else(|| PathBuf::from(INLINE_TEMPLATE));
        let name = path.to_string_lossy().into_owned();

        let ctx = context! {
            content => cx.content(),
            page => PageView::new(cx),
        };

        environment(cx)
            .render_named_str(&name, input, ctx)
            .map_err(|source| RenderError::Template { path, source })
    }
}

fn environment(cx: &RenderContext) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::None);

    let partial_cx = cx.clone();
    env.add_function("render_partial", move |name: String| {
        partial_cx
            .render_partial(name)
            .map(Value::from_safe_string)
            .map_err(to_template_error)
    });

    let paginate_cx = cx.clone();
    env.add_function("paginate", move |items: Value, per_page: usize| {
        let total = items.len().ok_or_else(|| {
            minijinja::Error::new(
                ErrorKind::InvalidOperation,
                "paginate() expects a sequence of items",
            )
        })?;
        let range = paginate_cx
            .paginate_window(total, per_page)
            .map_err(to_template_error)?
            .range();
        let window: Vec<Value> = items
            .try_iter()?
            .skip(range.start)
            .take(range.len())
            .collect();
        Ok::<_, minijinja::Error>(Value::from(window))
    });

    let pager_cx = cx.clone();
    env.add_function("pager", move || {
        pager_cx
            .pager()
            .map(|pager| Value::from_serialize(PagerView::new(&pager, pager_cx.page())))
            .unwrap_or_else(|| Value::from(()))
    });

    env.add_function("h", |text: String| escape_html(&text));
    env.add_filter("h", |text: String| escape_html(&text));
    env
}

/// Wrap a render failure so it survives the trip through minijinja.
fn to_template_error(err: RenderError) -> minijinja::Error {
    minijinja::Error::new(ErrorKind::InvalidOperation, err.to_string()).with_source(err)
}

#[derive(Serialize)]
struct PageView {
    path: PathBuf,
    destination: PathBuf,
    title: Option<String>,
    number: Option<usize>,
    vars: HashMap<String, serde_json::Value>,
}

impl PageView {
    fn new(cx: &RenderContext) -> Self {
        let page = cx.page();
        let number = cx.window_number();
        Self {
            path: page.path.clone(),
            destination: page.destination_for(number),
            title: page.meta.title.clone(),
            number,
            vars: page.meta.vars.clone(),
        }
    }
}

#[derive(Serialize)]
struct PagerView {
    number: usize,
    offset: usize,
    per_page: usize,
    total_items: usize,
    item_count: usize,
    has_next: bool,
    has_previous: bool,
    next_number: Option<usize>,
    previous_number: Option<usize>,
    next_url: Option<String>,
    previous_url: Option<String>,
}

impl PagerView {
    fn new(pager: &Pager, page: &tessera_store::Page) -> Self {
        let url = |number: usize| file_name(&page.destination_for(Some(number)));
        Self {
            number: pager.number(),
            offset: pager.offset(),
            per_page: pager.per_page(),
            total_items: pager.total_items(),
            item_count: pager.len(),
            has_next: pager.has_next(),
            has_previous: pager.has_previous(),
            next_number: pager.next_number(),
            previous_number: pager.previous_number(),
            next_url: pager.next_number().map(url),
            previous_url: pager.previous_number().map(url),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
