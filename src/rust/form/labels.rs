//! Localized feature labels, value translations and fixed UI strings.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Language the form is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }

    pub fn text(self) -> &'static UiText {
        match self {
            Locale::Ru => &RU_TEXT,
            Locale::En => &EN_TEXT,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" => Ok(Locale::Ru),
            "en" => Ok(Locale::En),
            other => Err(format!("unsupported locale '{}', expected 'ru' or 'en'", other)),
        }
    }
}

/// Fixed strings of the form page.
#[derive(Debug, Serialize)]
pub struct UiText {
    pub page_title: &'static str,
    pub heading: &'static str,
    pub form_heading: &'static str,
    pub submit: &'static str,
    pub not_specified: &'static str,
    pub edible: &'static str,
    pub poisonous: &'static str,
    pub confidence: &'static str,
    pub prediction_failed: &'static str,
    pub unknown_value: &'static str,
    pub missing_value: &'static str,
    pub model_failure: &'static str,
    pub guide_heading: &'static str,
}

static RU_TEXT: UiText = UiText {
    page_title: "Грибной ИИ",
    heading: "🍄 ИИ для определения съедобности гриба",
    form_heading: "🔍 Введите характеристики гриба",
    submit: "Предсказать",
    not_specified: "❌ Не указывать",
    edible: "✅ Гриб съедобный!",
    poisonous: "☠️ Гриб ядовитый!",
    confidence: "Уверенность модели",
    prediction_failed: "⚠️ Ошибка предсказания",
    unknown_value: "Неизвестное значение '{value}' для признака {feature}",
    missing_value: "Не выбрано значение для признака {feature}",
    model_failure: "Сбой модели: {detail}",
    guide_heading: "📖 Как распознать признаки гриба",
};

static EN_TEXT: UiText = UiText {
    page_title: "Mushroom AI",
    heading: "🍄 Mushroom edibility AI",
    form_heading: "🔍 Describe the mushroom",
    submit: "Predict",
    not_specified: "❌ Not specified",
    edible: "✅ The mushroom is edible!",
    poisonous: "☠️ The mushroom is poisonous!",
    confidence: "Model confidence",
    prediction_failed: "⚠️ Prediction error",
    unknown_value: "Unknown value '{value}' for feature {feature}",
    missing_value: "No value selected for feature {feature}",
    model_failure: "Model failure: {detail}",
    guide_heading: "📖 How to recognize mushroom traits",
};

type Table = HashMap<&'static str, HashMap<&'static str, &'static str>>;

fn codes(pairs: &[(&'static str, &'static str)]) -> HashMap<&'static str, &'static str> {
    pairs.iter().copied().collect()
}

lazy_static! {
    static ref RU_VALUES: Table = {
        let mut m = HashMap::new();
        m.insert("odor", codes(&[
            ("a", "миндальный"), ("l", "анисовый"), ("c", "клёновый"), ("y", "рыбный"),
            ("f", "гнилой"), ("m", "затхлый"), ("n", "без запаха"), ("p", "едкий"), ("s", "пряный"),
        ]));
        m.insert("gill-size", codes(&[("b", "широкие"), ("n", "узкие")]));
        m.insert("spore-print-color", codes(&[
            ("k", "чёрный"), ("n", "коричневый"), ("b", "бежевый"), ("h", "шоколадный"),
            ("r", "зелёный"), ("o", "оранжевый"), ("u", "фиолетовый"), ("w", "белый"), ("y", "жёлтый"),
        ]));
        m.insert("gill-color", codes(&[
            ("k", "чёрный"), ("n", "коричневый"), ("b", "бежевый"), ("h", "шоколадный"),
            ("g", "серый"), ("e", "бежевый"), ("w", "белый"), ("y", "жёлтый"), ("r", "зелёный"),
            ("p", "розовый"), ("u", "фиолетовый"), ("o", "оранжевый"),
        ]));
        m.insert("ring-type", codes(&[
            ("c", "кольцо-клубок"), ("e", "висячее"), ("f", "вспышкообразное"), ("l", "большое"),
            ("n", "нет"), ("p", "подвесное"), ("s", "приземистое"), ("z", "морщинистое"),
        ]));
        m.insert("population", codes(&[
            ("a", "изолированная"), ("c", "скученная"), ("n", "многочисленная"),
            ("s", "рассеянная"), ("v", "разнообразная"), ("y", "обильная"),
        ]));
        m
    };

    static ref EN_VALUES: Table = {
        let mut m = HashMap::new();
        m.insert("odor", codes(&[
            ("a", "almond"), ("l", "anise"), ("c", "creosote"), ("y", "fishy"),
            ("f", "foul"), ("m", "musty"), ("n", "none"), ("p", "pungent"), ("s", "spicy"),
        ]));
        m.insert("gill-size", codes(&[("b", "broad"), ("n", "narrow")]));
        m.insert("spore-print-color", codes(&[
            ("k", "black"), ("n", "brown"), ("b", "buff"), ("h", "chocolate"),
            ("r", "green"), ("o", "orange"), ("u", "purple"), ("w", "white"), ("y", "yellow"),
        ]));
        m.insert("gill-color", codes(&[
            ("k", "black"), ("n", "brown"), ("b", "buff"), ("h", "chocolate"),
            ("g", "gray"), ("e", "red"), ("w", "white"), ("y", "yellow"), ("r", "green"),
            ("p", "pink"), ("u", "purple"), ("o", "orange"),
        ]));
        m.insert("ring-type", codes(&[
            ("c", "cobwebby"), ("e", "evanescent"), ("f", "flaring"), ("l", "large"),
            ("n", "none"), ("p", "pendant"), ("s", "sheathing"), ("z", "zone"),
        ]));
        m.insert("population", codes(&[
            ("a", "abundant"), ("c", "clustered"), ("n", "numerous"),
            ("s", "scattered"), ("v", "several"), ("y", "solitary"),
        ]));
        m
    };
}

/// Human label for a feature; unknown features keep their raw name.
pub fn feature_label(locale: Locale, feature: &str) -> &str {
    let (ru, en) = match feature {
        "odor" => ("Запах", "Odor"),
        "gill-size" => ("Размер пластинок", "Gill size"),
        "spore-print-color" => ("Цвет спорового отпечатка", "Spore print color"),
        "gill-color" => ("Цвет пластинок", "Gill color"),
        "ring-type" => ("Тип кольца", "Ring type"),
        "population" => ("Плотность популяции", "Population density"),
        _ => return feature,
    };
    match locale {
        Locale::Ru => ru,
        Locale::En => en,
    }
}

/// Localized name of a raw code; untranslated codes fall back to the code itself.
pub fn value_label<'a>(locale: Locale, feature: &str, code: &'a str) -> &'a str {
    let values = match locale {
        Locale::Ru => &*RU_VALUES,
        Locale::En => &*EN_VALUES,
    };
    values
        .get(feature)
        .and_then(|codes| codes.get(code))
        .copied()
        .unwrap_or(code)
}

/// Fills `{name}` placeholders of a UI template in a single pass; substituted
/// values are never scanned again.
pub(crate) fn fill(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let arg = tail.find('}').and_then(|end| {
            let name = &tail[1..end];
            args.iter().find(|(n, _)| *n == name).map(|(_, value)| (*value, end))
        });
        match arg {
            Some((value, end)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_labels() {
        assert_eq!(feature_label(Locale::Ru, "odor"), "Запах");
        assert_eq!(feature_label(Locale::En, "ring-type"), "Ring type");
        assert_eq!(feature_label(Locale::En, "cap-shape"), "cap-shape");
    }

    #[test]
    fn test_value_fallback_to_code() {
        assert_eq!(value_label(Locale::Ru, "odor", "n"), "без запаха");
        assert_eq!(value_label(Locale::En, "population", "s"), "scattered");
        assert_eq!(value_label(Locale::En, "odor", "x"), "x");
        assert_eq!(value_label(Locale::Ru, "stalk-root", "b"), "b");
    }

    #[test]
    fn test_locale_parsing() {
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!(" ru ".parse::<Locale>().unwrap(), Locale::Ru);
        assert!("de".parse::<Locale>().is_err());
    }

    #[test]
    fn test_fill_placeholders() {
        let text = fill(Locale::En.text().unknown_value, &[("value", "z"), ("feature", "odor")]);
        assert_eq!(text, "Unknown value 'z' for feature odor");
    }

    #[test]
    fn test_fill_does_not_expand_substituted_values() {
        let text = fill(Locale::En.text().unknown_value, &[("value", "{feature}"), ("feature", "odor")]);
        assert_eq!(text, "Unknown value '{feature}' for feature odor");

        assert_eq!(fill("{a} {unknown} {", &[("a", "1")]), "1 {unknown} {");
    }
}
