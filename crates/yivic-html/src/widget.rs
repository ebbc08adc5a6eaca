/*
 * widget.rs
 * Copyright (c) 2025 Yivic
 */

//! Widget settings: instance normalization, admin forms and view data.
//!
//! Widget instances arrive as loosely typed JSON objects (whatever the host
//! stored). Widgets turn them into typed [`FormValues`] for the admin form and
//! into view data for rendering; fetching posts or comments is left to the
//! host.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::{Map, Value};

use crate::form::{Field, FieldNamer, FieldValue, FormValues, render_form};
use crate::html::Options;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static LEADING_INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[+-]?\d+").unwrap());

/// A stored widget instance.
pub type Instance = Map<String, Value>;

/// Translates a UI string.
pub type Translator = Arc<dyn Fn(&str) -> String + Send + Sync>;

pub fn identity_translator() -> Translator {
    Arc::new(|text: &str| text.to_string())
}

/// `value`, limited to `min..=max`.
pub fn clamp_int(value: i64, min: i64, max: i64) -> i64 {
    value.min(max).max(min)
}

/// Loose string view of a stored value. Null and containers are `""`.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        _ => String::new(),
    }
}

/// Loose integer view of a stored value.
///
/// Strings contribute their leading integer (`"12px"` is 12), floats are
/// truncated, `true` is 1, and anything else is 0.
pub fn value_to_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => LEADING_INT
            .find(s)
            .and_then(|m| m.as_str().trim().parse().ok())
            .unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

/// Non-negative integer view of a stored value.
pub fn absint(value: &Value) -> i64 {
    value_to_int(value).saturating_abs()
}

/// Plain single-line text: tags removed, whitespace collapsed, trimmed.
pub fn sanitize_text_field(text: &str) -> String {
    let stripped = TAG.replace_all(text, "");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Instance title, trimmed, or `fallback` when blank or missing.
pub fn resolve_title(instance: &Instance, fallback: &str) -> String {
    let title = instance.get("title").map(value_to_string).unwrap_or_default();
    let title = title.trim();
    if title.is_empty() {
        fallback.to_string()
    } else {
        title.to_string()
    }
}

/// Transient key: namespace, blog id, widget id base, group and parts,
/// joined with `_`.
pub fn cache_key(
    namespace: &str,
    blog_id: u64,
    id_base: &str,
    group: &str,
    parts: &[&dyn fmt::Display],
) -> String {
    let mut key = format!("{}_{}_{}_{}", namespace, blog_id, id_base, group);
    for part in parts {
        key.push('_');
        key.push_str(&part.to_string());
    }
    key
}

/// A settings-driven widget.
pub trait Widget {
    fn id_base(&self) -> &str;

    /// View rendered on the front end (dot notation).
    fn view_name(&self) -> &str;

    /// Typed, defaulted values for a stored instance.
    fn values_from_instance(&self, instance: &Instance) -> FormValues;

    fn schema(&self, values: &FormValues) -> Vec<Field>;

    /// Sanitize a submitted instance before it is stored.
    fn update(&self, new_instance: &Instance, old_instance: &Instance) -> Instance;

    /// Admin form markup for an instance.
    fn form(&self, namer: &dyn FieldNamer, instance: &Instance) -> String {
        let values = self.values_from_instance(instance);
        let schema = self.schema(&values);
        render_form(namer, &schema, &values)
    }

    /// Data handed to the front-end view.
    fn view_data(&self, _number: u32, instance: &Instance) -> Map<String, Value> {
        values_to_json(&self.values_from_instance(instance))
    }
}

pub fn values_to_json(values: &FormValues) -> Map<String, Value> {
    values
        .iter()
        .map(|(key, value)| {
            let value = match value {
                FieldValue::Text(text) => Value::String(text.clone()),
                FieldValue::Int(n) => Value::from(*n),
                FieldValue::Bool(b) => Value::Bool(*b),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Where the "featured" tab takes its posts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeaturedSource {
    #[default]
    Sticky,
    Latest,
    Category,
    Tag,
}

impl FeaturedSource {
    pub const ALL: [FeaturedSource; 4] = [
        FeaturedSource::Sticky,
        FeaturedSource::Latest,
        FeaturedSource::Category,
        FeaturedSource::Tag,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeaturedSource::Sticky => "sticky",
            FeaturedSource::Latest => "latest",
            FeaturedSource::Category => "category",
            FeaturedSource::Tag => "tag",
        }
    }

    /// Exact match on the stored name; anything unknown is `Sticky`.
    pub fn normalize(source: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == source)
            .unwrap_or_default()
    }
}

impl fmt::Display for FeaturedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tabbed widget: featured, recent posts and recent comments.
pub struct TabsWidget {
    categories: Options,
    tags: Options,
    translate: Translator,
}

impl fmt::Debug for TabsWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabsWidget")
            .field("categories", &self.categories)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

impl Default for TabsWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl TabsWidget {
    pub const ID_BASE: &'static str = "yivic_lite_child_widget_tabs";
    pub const VIEW: &'static str = "widgets.widget_tabs";
    pub const CLASS_NAME: &'static str = "yivic-lite-widget--tabs";
    pub const CACHE_NS: &'static str = "yivic_lite_child_tabs";
    pub const DEFAULT_COUNT: i64 = 3;
    pub const MIN_COUNT: i64 = 1;
    pub const MAX_COUNT: i64 = 10;

    pub fn new() -> Self {
        Self {
            categories: Options::new(),
            tags: Options::new(),
            translate: identity_translator(),
        }
    }

    /// Category choices (term id → name) for the featured-category select.
    pub fn with_categories(mut self, categories: Options) -> Self {
        self.categories = categories;
        self
    }

    /// Tag choices (term id → name) for the featured-tag select.
    pub fn with_tags(mut self, tags: Options) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_translator(mut self, translate: Translator) -> Self {
        self.translate = translate;
        self
    }

    fn t(&self, text: &str) -> String {
        (self.translate)(text)
    }

    pub fn name(&self) -> String {
        self.t("Yivic Lite Child: Widget Tabs")
    }

    pub fn description(&self) -> String {
        self.t("Tabbed widget: Featured / Recent / Comments (Blade).")
    }

    fn count(instance: &Instance, key: &str) -> i64 {
        let raw = match instance.get(key) {
            None | Some(Value::Null) => Self::DEFAULT_COUNT,
            Some(value) => value_to_int(value),
        };
        clamp_int(raw, Self::MIN_COUNT, Self::MAX_COUNT)
    }

    fn source(instance: &Instance) -> FeaturedSource {
        match instance.get("featured_source") {
            None | Some(Value::Null) => FeaturedSource::Sticky,
            Some(value) => FeaturedSource::normalize(&value_to_string(value)),
        }
    }

    fn term_id(instance: &Instance, key: &str, to_int: fn(&Value) -> i64) -> i64 {
        match instance.get(key) {
            None | Some(Value::Null) => 0,
            Some(value) => to_int(value),
        }
    }

    /// Transient keys the widget's post and comment lookups may use for a
    /// blog. These are what a settings update invalidates.
    pub fn cache_keys(&self, blog_id: u64) -> Vec<String> {
        let mut keys = Vec::new();
        for n in Self::MIN_COUNT..=Self::MAX_COUNT {
            keys.push(cache_key(Self::CACHE_NS, blog_id, Self::ID_BASE, "recent", &[&n]));
            keys.push(cache_key(Self::CACHE_NS, blog_id, Self::ID_BASE, "comments", &[&n]));
            for source in FeaturedSource::ALL {
                keys.push(cache_key(
                    Self::CACHE_NS,
                    blog_id,
                    Self::ID_BASE,
                    "featured",
                    &[&n, &source, &0],
                ));
            }
        }
        keys
    }
}

impl Widget for TabsWidget {
    fn id_base(&self) -> &str {
        Self::ID_BASE
    }

    fn view_name(&self) -> &str {
        Self::VIEW
    }

    fn values_from_instance(&self, instance: &Instance) -> FormValues {
        let mut values = FormValues::new();
        values.insert(
            "title".to_string(),
            resolve_title(instance, &self.t("Widget Tabs")).into(),
        );
        values.insert(
            "featured_source".to_string(),
            Self::source(instance).as_str().into(),
        );
        values.insert(
            "featured_cat_id".to_string(),
            Self::term_id(instance, "featured_cat_id", value_to_int).into(),
        );
        values.insert(
            "featured_tag_id".to_string(),
            Self::term_id(instance, "featured_tag_id", value_to_int).into(),
        );
        for key in ["featured_count", "recent_count", "comment_count"] {
            values.insert(key.to_string(), Self::count(instance, key).into());
        }
        values
    }

    fn schema(&self, _values: &FormValues) -> Vec<Field> {
        let sources: Options = [
            (FeaturedSource::Sticky, "Sticky posts"),
            (FeaturedSource::Latest, "Latest posts"),
            (FeaturedSource::Category, "Category"),
            (FeaturedSource::Tag, "Tag"),
        ]
        .into_iter()
        .map(|(source, label)| (source.as_str().to_string(), self.t(label)))
        .collect();

        vec![
            Field::text("title", self.t("Title")).with_attr("class", "widefat"),
            Field::select("featured_source", self.t("Featured source"), sources)
                .with_attr("class", "widefat"),
            Field::select(
                "featured_cat_id",
                self.t("Featured category"),
                self.categories.clone(),
            )
            .when("featured_source", FeaturedSource::Category.as_str())
            .with_empty(self.t("— Select category —"))
            .with_attr("class", "widefat"),
            Field::select("featured_tag_id", self.t("Featured tag"), self.tags.clone())
                .when("featured_source", FeaturedSource::Tag.as_str())
                .with_empty(self.t("— Select tag —"))
                .with_attr("class", "widefat"),
            Field::number(
                "featured_count",
                self.t("Featured items"),
                Self::MIN_COUNT,
                Self::MAX_COUNT,
            ),
            Field::number(
                "recent_count",
                self.t("Recent items"),
                Self::MIN_COUNT,
                Self::MAX_COUNT,
            ),
            Field::number(
                "comment_count",
                self.t("Comment items"),
                Self::MIN_COUNT,
                Self::MAX_COUNT,
            ),
        ]
    }

    fn update(&self, new_instance: &Instance, _old_instance: &Instance) -> Instance {
        let mut instance = Instance::new();
        let title = new_instance
            .get("title")
            .map(|v| sanitize_text_field(&value_to_string(v)))
            .unwrap_or_default();
        instance.insert("title".to_string(), Value::String(title));
        instance.insert(
            "featured_source".to_string(),
            Value::String(Self::source(new_instance).as_str().to_string()),
        );
        for key in ["featured_cat_id", "featured_tag_id"] {
            instance.insert(key.to_string(), Value::from(Self::term_id(new_instance, key, absint)));
        }
        for key in ["featured_count", "recent_count", "comment_count"] {
            instance.insert(key.to_string(), Value::from(Self::count(new_instance, key)));
        }
        tracing::debug!(widget = Self::ID_BASE, "Widget settings updated");
        instance
    }

    fn view_data(&self, number: u32, instance: &Instance) -> Map<String, Value> {
        let mut data = values_to_json(&self.values_from_instance(instance));
        data.insert(
            "dom_id".to_string(),
            Value::String(format!("widget-tabs-{}", number)),
        );
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::WidgetFieldNamer;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn instance(value: Value) -> Instance {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_helpers() {
        assert_eq!(clamp_int(0, 1, 10), 1);
        assert_eq!(clamp_int(42, 1, 10), 10);
        assert_eq!(clamp_int(5, 1, 10), 5);
        assert_eq!(value_to_int(&json!("12px")), 12);
        assert_eq!(value_to_int(&json!(" -4")), -4);
        assert_eq!(value_to_int(&json!("abc")), 0);
        assert_eq!(value_to_int(&json!(7.9)), 7);
        assert_eq!(absint(&json!("-15")), 15);
        assert_eq!(
            sanitize_text_field("  <b>Hot</b>\n\tnews  <script>x</script> "),
            "Hot news x"
        );
    }

    #[test]
    fn test_cache_key_joins_with_underscores() {
        assert_eq!(
            cache_key("yivic_widget", 1, "tabs", "featured", &[&3, &"sticky", &0]),
            "yivic_widget_1_tabs_featured_3_sticky_0"
        );
        assert_eq!(cache_key("ns", 2, "w", "recent", &[]), "ns_2_w_recent");
    }

    #[test]
    fn test_resolve_title() {
        assert_eq!(resolve_title(&instance(json!({"title": "  News "})), "X"), "News");
        assert_eq!(resolve_title(&instance(json!({"title": "   "})), "X"), "X");
        assert_eq!(resolve_title(&Instance::new(), "X"), "X");
    }

    #[test]
    fn test_values_defaults() {
        let values = TabsWidget::new().values_from_instance(&Instance::new());
        assert_eq!(values["title"], FieldValue::Text("Widget Tabs".to_string()));
        assert_eq!(values["featured_source"], FieldValue::Text("sticky".to_string()));
        assert_eq!(values["featured_cat_id"], FieldValue::Int(0));
        assert_eq!(values["featured_count"], FieldValue::Int(3));
        assert_eq!(values["recent_count"], FieldValue::Int(3));
        assert_eq!(values["comment_count"], FieldValue::Int(3));
    }

    #[test]
    fn test_values_normalize_and_clamp() {
        let values = TabsWidget::new().values_from_instance(&instance(json!({
            "featured_source": "popular",
            "featured_count": 50,
            "recent_count": "0",
            "comment_count": null,
            "featured_tag_id": "9"
        })));
        assert_eq!(values["featured_source"], FieldValue::Text("sticky".to_string()));
        assert_eq!(values["featured_count"], FieldValue::Int(10));
        assert_eq!(values["recent_count"], FieldValue::Int(1));
        assert_eq!(values["comment_count"], FieldValue::Int(3));
        assert_eq!(values["featured_tag_id"], FieldValue::Int(9));
    }

    #[test]
    fn test_update_sanitizes() {
        let widget = TabsWidget::new();
        let stored = widget.update(
            &instance(json!({
                "title": "<em>Top</em>  stories",
                "featured_source": "category",
                "featured_cat_id": "-5",
                "featured_count": "4",
                "recent_count": 99
            })),
            &Instance::new(),
        );
        assert_eq!(
            Value::Object(stored),
            json!({
                "title": "Top stories",
                "featured_source": "category",
                "featured_cat_id": 5,
                "featured_tag_id": 0,
                "featured_count": 4,
                "recent_count": 10,
                "comment_count": 3
            })
        );
    }

    #[test]
    fn test_form_shows_category_select_only_for_category_source() {
        let categories: Options = [("5".to_string(), "News".to_string())].into_iter().collect();
        let widget = TabsWidget::new().with_categories(categories);
        let namer = WidgetFieldNamer::new(TabsWidget::ID_BASE, 1);

        let sticky = widget.form(&namer, &Instance::new());
        assert!(!sticky.contains("featured_cat_id"));
        assert!(!sticky.contains("featured_tag_id"));
        assert!(sticky.contains(r#"value="Widget Tabs""#));

        let category = widget.form(
            &namer,
            &instance(json!({"featured_source": "category", "featured_cat_id": 5})),
        );
        assert!(category.contains("widget-yivic_lite_child_widget_tabs[1][featured_cat_id]"));
        assert!(category.contains("— Select category —"));
        assert!(category.contains(r#"<option value="5" selected="selected">News</option>"#));
        assert!(!category.contains("featured_tag_id"));
    }

    #[test]
    fn test_translator_is_used() {
        let widget = TabsWidget::new()
            .with_translator(Arc::new(|text: &str| format!("[{}]", text)));
        let values = widget.values_from_instance(&Instance::new());
        assert_eq!(values["title"], FieldValue::Text("[Widget Tabs]".to_string()));
        assert_eq!(widget.name(), "[Yivic Lite Child: Widget Tabs]");
    }

    #[test]
    fn test_view_data_and_cache_keys() {
        let widget = TabsWidget::new();
        let data = widget.view_data(4, &instance(json!({"title": "Hi"})));
        assert_eq!(data["title"], json!("Hi"));
        assert_eq!(data["dom_id"], json!("widget-tabs-4"));

        let keys = widget.cache_keys(1);
        assert_eq!(keys.len(), 10 * 6);
        assert!(keys.contains(&"yivic_lite_child_tabs_1_yivic_lite_child_widget_tabs_featured_3_latest_0".to_string()));
        assert!(keys.contains(&"yivic_lite_child_tabs_1_yivic_lite_child_widget_tabs_recent_10".to_string()));
    }
}
