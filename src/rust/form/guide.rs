//! Static observation guide shown under the form: reference images with
//! captions and short tips for traits that are hard to judge by eye.

use serde::Serialize;

use super::labels::Locale;

/// Image files the guide refers to, relative to the images directory
pub const GUIDE_IMAGES: [&str; 4] = ["gill_wide.jpg", "gill_narrow.jpg", "gill_color.jpg", "ring_type.jpg"];

#[derive(Debug, Clone, Serialize)]
pub struct GuideImage {
    pub file: &'static str,
    pub caption: &'static str,
}

/// A tip about one trait, rendered as `**term:** text`.
#[derive(Debug, Clone, Serialize)]
pub struct GuideTip {
    pub term: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuideBlock {
    /// Images displayed side by side in one row
    Images { heading: &'static str, images: Vec<GuideImage> },
    Tips { heading: &'static str, tips: Vec<GuideTip> },
    Note { text: &'static str },
}

fn image(file: &'static str, caption: &'static str) -> GuideImage {
    GuideImage { file, caption }
}

fn tip(term: &'static str, text: &'static str) -> GuideTip {
    GuideTip { term, text }
}

/// Guide blocks in display order.
pub fn guide(locale: Locale) -> Vec<GuideBlock> {
    match locale {
        Locale::Ru => vec![
            GuideBlock::Images {
                heading: "📏 Размер пластинок",
                images: vec![
                    image("gill_wide.jpg", "Широкие пластинки"),
                    image("gill_narrow.jpg", "Узкие пластинки"),
                ],
            },
            GuideBlock::Images {
                heading: "🎨 Цвет пластинок",
                images: vec![image("gill_color.jpg", "Пример фиолетового цвета пластинки")],
            },
            GuideBlock::Images {
                heading: "🔘 Тип кольца",
                images: vec![image("ring_type.jpg", "Пример вспышкообразного кольца")],
            },
            GuideBlock::Tips {
                heading: "🧭 Как определять другие признаки гриба",
                tips: vec![
                    tip(
                        "Запах (odor)",
                        "аккуратно разломите шляпку гриба и понюхайте. Признаки могут варьироваться от фруктового до остро-пряного. Некоторые запахи (анисовый, миндальный) приятны, другие (рыбный, креозотовый) неприятны.",
                    ),
                    tip(
                        "Цвет спорового отпечатка",
                        "положите шляпку гриба пластинками вниз на белую бумагу, накройте стаканом и оставьте на ночь. Утром посмотрите на цвет отпечатка.",
                    ),
                    tip(
                        "Плотность популяции",
                        "оцените количество таких грибов поблизости. Растут ли они кучно или поодиночке? Это поможет указать правильную плотность.",
                    ),
                ],
            },
            GuideBlock::Note {
                text: "🔎 Советуем использовать хорошее освещение и при необходимости лупу. Чем точнее данные, тем надёжнее предсказание.",
            },
        ],
        Locale::En => vec![
            GuideBlock::Images {
                heading: "📏 Gill size",
                images: vec![
                    image("gill_wide.jpg", "Broad gills"),
                    image("gill_narrow.jpg", "Narrow gills"),
                ],
            },
            GuideBlock::Images {
                heading: "🎨 Gill color",
                images: vec![image("gill_color.jpg", "Example of purple gills")],
            },
            GuideBlock::Images {
                heading: "🔘 Ring type",
                images: vec![image("ring_type.jpg", "Example of a flaring ring")],
            },
            GuideBlock::Tips {
                heading: "🧭 How to judge the other traits",
                tips: vec![
                    tip(
                        "Odor",
                        "carefully break the cap and smell it. Odors range from fruity to sharp and spicy. Some (anise, almond) are pleasant, others (fishy, creosote) are not.",
                    ),
                    tip(
                        "Spore print color",
                        "place the cap gills down on white paper, cover it with a glass and leave it overnight. Check the color of the print in the morning.",
                    ),
                    tip(
                        "Population density",
                        "count how many similar mushrooms grow nearby. Do they grow in clusters or alone? That tells you which density to pick.",
                    ),
                ],
            },
            GuideBlock::Note {
                text: "🔎 Use good lighting and a magnifier if needed. The more accurate the input, the more reliable the prediction.",
            },
        ],
    }
}

/// Renders the guide as markdown, for terminal output.
pub fn guide_markdown(locale: Locale) -> String {
    let mut out = format!("## {}\n\n", locale.text().guide_heading);
    for block in guide(locale) {
        match block {
            GuideBlock::Images { heading, images } => {
                out.push_str(&format!("### {}\n\n", heading));
                for img in images {
                    out.push_str(&format!("![{}](images/{})\n", img.caption, img.file));
                }
                out.push('\n');
            }
            GuideBlock::Tips { heading, tips } => {
                out.push_str(&format!("### {}\n\n", heading));
                for t in tips {
                    out.push_str(&format!("- **{}:** {}\n", t.term, t.text));
                }
                out.push('\n');
            }
            GuideBlock::Note { text } => {
                out.push_str(text);
                out.push('\n');
            }
        }
    }
    out
}
