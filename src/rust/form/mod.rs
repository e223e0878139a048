//! Form generation: localized selectors derived from the bundle's encoders,
//! parsing of submitted selections, and the static observation guide.

mod fields;
mod guide;
mod labels;

pub use fields::{
    allows_unspecified, option_text, parse_option, render_form, Field, FieldOption, FormSpec, Selection,
    OPTIONAL_FEATURES, OPTION_SEPARATOR,
};
pub use guide::{guide, guide_markdown, GuideBlock, GuideImage, GuideTip, GUIDE_IMAGES};
pub use labels::{feature_label, value_label, Locale, UiText};
pub(crate) use labels::fill;
