//! Server-side rendering of the form page.

use minijinja::{context, Environment};
use serde::Serialize;

use super::ServerError;
use crate::form::{guide, FormSpec, Selection};
use crate::service::Outcome;

const PAGE_NAME: &str = "page.html";
const PAGE_TEMPLATE: &str = include_str!("templates/page.html");

#[derive(Debug, Serialize)]
struct OptionView<'a> {
    value: &'a str,
    text: &'a str,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct FieldView<'a> {
    feature: &'a str,
    label: &'a str,
    options: Vec<OptionView<'a>>,
}

fn field_views<'a>(form: &'a FormSpec, selection: &'a Selection) -> Vec<FieldView<'a>> {
    form.fields
        .iter()
        .map(|field| {
            let chosen = selection.get(&field.feature).flatten();
            FieldView {
                feature: &field.feature,
                label: &field.label,
                options: field
                    .options
                    .iter()
                    .map(|option| OptionView {
                        value: option.code.as_deref().unwrap_or(""),
                        text: &option.text,
                        selected: option.code.is_some() && option.code.as_deref() == chosen,
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Template environment; `.html` names are auto-escaped.
fn environment() -> Result<Environment<'static>, ServerError> {
    let mut env = Environment::new();
    env.add_template(PAGE_NAME, PAGE_TEMPLATE)?;
    Ok(env)
}

/// Renders the full page: selectors, the outcome of the last submit (if
/// any), and the observation guide.
pub fn render_page(form: &FormSpec, selection: &Selection, outcome: Option<&Outcome>) -> Result<String, ServerError> {
    let locale = form.locale;
    let env = environment()?;
    let page = env.get_template(PAGE_NAME)?.render(context! {
        lang => locale.code(),
        text => locale.text(),
        fields => field_views(form, selection),
        outcome => outcome,
        guide => guide(locale),
    })?;
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{Field, FieldOption, Locale};
    use crate::service::Severity;

    fn form() -> FormSpec {
        FormSpec {
            locale: Locale::En,
            fields: vec![Field {
                feature: "spore-print-color".into(),
                label: "Spore print color".into(),
                allows_unspecified: true,
                options: vec![
                    FieldOption { code: None, text: "❌ Not specified".into() },
                    FieldOption { code: Some("k".into()), text: "k — black".into() },
                    FieldOption { code: Some("w".into()), text: "w — white".into() },
                ],
            }],
        }
    }

    #[test]
    fn test_values_are_escaped() {
        let outcome = Outcome {
            severity: Severity::Warning,
            title: "<b>title</b>".into(),
            detail: "a & \"b\"".into(),
        };
        let page = render_page(&form(), &Selection::new(), Some(&outcome)).unwrap();
        assert!(page.contains("&lt;b&gt;title&lt;"));
        assert!(page.contains("a &amp; &quot;b&quot;"));
        assert!(!page.contains("<b>title</b>"));
    }

    #[test]
    fn test_page_keeps_selected_option() {
        let selection = Selection::new().with("spore-print-color", "w");
        let page = render_page(&form(), &selection, None).unwrap();
        assert!(page.contains("<option value=\"w\" selected>w — white</option>"));
        assert!(page.contains("<option value=\"k\">k — black</option>"));
        assert!(page.contains("<option value=\"\">❌ Not specified</option>"));
        assert!(page.contains("action=\"/predict?lang=en\""));
        assert!(!page.contains("class=\"block"));
    }

    #[test]
    fn test_unspecified_selection_selects_nothing() {
        let selection = Selection::new().with_unspecified("spore-print-color");
        let page = render_page(&form(), &selection, None).unwrap();
        assert!(!page.contains(" selected>"));
    }

    #[test]
    fn test_page_renders_outcome_and_guide() {
        let outcome = Outcome {
            severity: Severity::Warning,
            title: "⚠️ Prediction error".into(),
            detail: "Unknown value 'z' for feature odor".into(),
        };
        let page = render_page(&form(), &Selection::new(), Some(&outcome)).unwrap();
        assert!(page.contains("class=\"block warning\""));
        assert!(page.contains("Unknown value &#x27;z&#x27; for feature odor"));
        assert!(page.contains("src=\"/images/gill_wide.jpg\""));
        assert!(page.contains("<h2>📖 How to recognize mushroom traits</h2>"));
    }
}
