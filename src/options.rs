use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("invalid orientation value provided")]
    Orientation,
    #[error("invalid {0} value provided")]
    Integer(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    fn as_str(self) -> &'static str {
        match self {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        }
    }
}

/// Rendering options for a single request, parsed from its query string.
#[derive(Debug, PartialEq, Eq)]
pub struct RenderOptions {
    pub grayscale: bool,
    pub lowquality: bool,
    pub orientation: Orientation,
    pub forms: bool,
    pub images: bool,
    pub javascript: bool,
    pub pagesize: String,
    pub title: Option<String>,
    pub image_dpi: Option<u64>,
    pub image_quality: Option<u64>,
    pub margin_left: Option<String>,
    pub margin_right: Option<String>,
    pub margin_top: Option<String>,
    pub margin_bottom: Option<String>,
    pub shrinking: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            grayscale: false,
            lowquality: false,
            orientation: Orientation::Portrait,
            forms: false,
            images: true,
            javascript: true,
            pagesize: "A4".to_string(),
            title: None,
            image_dpi: None,
            image_quality: None,
            margin_left: None,
            margin_right: None,
            margin_top: None,
            margin_bottom: None,
            shrinking: true,
        }
    }
}

// A flag is set only by the literal value "1"; anything else counts as unset.
fn bool_option(query: &HashMap<String, String>, key: &str) -> bool {
    query.get(key).map(|value| value == "1").unwrap_or(false)
}

fn string_option(query: &HashMap<String, String>, key: &str) -> Option<String> {
    query.get(key).filter(|value| !value.is_empty()).cloned()
}

// Non-positive values are treated as "not provided" rather than rejected.
// Positive values pass through verbatim, however large.
fn int_option(
    query: &HashMap<String, String>,
    key: &'static str,
) -> Result<Option<u64>, OptionsError> {
    match query.get(key).filter(|value| !value.is_empty()) {
        Some(value) => match value.parse::<i64>() {
            Ok(parsed) if parsed > 0 => Ok(Some(parsed as u64)),
            Ok(_) => Ok(None),
            Err(_) => Err(OptionsError::Integer(key)),
        },
        None => Ok(None),
    }
}

impl RenderOptions {
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, OptionsError> {
        let orientation = match query.get("orientation").map(String::as_str) {
            Some("P") | Some("") | None => Orientation::Portrait,
            Some("L") => Orientation::Landscape,
            Some(_) => return Err(OptionsError::Orientation),
        };

        Ok(Self {
            grayscale: bool_option(query, "grayscale"),
            lowquality: bool_option(query, "lowquality"),
            orientation,
            forms: bool_option(query, "forms"),
            images: !bool_option(query, "noimages"),
            javascript: !bool_option(query, "nojavascript"),
            pagesize: string_option(query, "pagesize").unwrap_or_else(|| "A4".to_string()),
            title: string_option(query, "title"),
            image_dpi: int_option(query, "imagedpi")?,
            image_quality: int_option(query, "imagequality")?,
            margin_left: string_option(query, "marginleft"),
            margin_right: string_option(query, "marginright"),
            margin_top: string_option(query, "margintop"),
            margin_bottom: string_option(query, "marginbottom"),
            shrinking: !bool_option(query, "shrinking"),
        })
    }

    /// Builds the wkhtmltopdf argument list. The trailing `- -` tells the
    /// renderer to read HTML from stdin and write the PDF to stdout.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["--encoding".to_string(), "utf-8".to_string()];

        if self.grayscale {
            args.push("--grayscale".to_string());
        }
        if let Some(margin) = &self.margin_left {
            args.push("--margin-left".to_string());
            args.push(margin.clone());
        }
        if let Some(margin) = &self.margin_right {
            args.push("--margin-right".to_string());
            args.push(margin.clone());
        }
        if let Some(margin) = &self.margin_top {
            args.push("--margin-top".to_string());
            args.push(margin.clone());
        }
        if let Some(margin) = &self.margin_bottom {
            args.push("--margin-bottom".to_string());
            args.push(margin.clone());
        }
        if self.lowquality {
            args.push("--lowquality".to_string());
        }
        if self.forms {
            args.push("--enable-forms".to_string());
        }
        if !self.images {
            args.push("--no-images".to_string());
        }
        if !self.shrinking {
            args.push("--disable-smart-shrinking".to_string());
        }
        if !self.javascript {
            args.push("--disable-javascript".to_string());
        }
        args.push("--orientation".to_string());
        args.push(self.orientation.as_str().to_string());
        args.push("--page-size".to_string());
        args.push(self.pagesize.clone());
        if let Some(title) = &self.title {
            args.push("--title".to_string());
            args.push(title.clone());
        }
        if let Some(dpi) = self.image_dpi {
            args.push("--image-dpi".to_string());
            args.push(dpi.to_string());
        }
        if let Some(quality) = self.image_quality {
            args.push("--image-quality".to_string());
            args.push(quality.to_string());
        }
        args.push("--include-in-outline".to_string());
        args.push("-".to_string());
        args.push("-".to_string());

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_query_yields_defaults() {
        let opts = RenderOptions::from_query(&query(&[])).unwrap();
        assert_eq!(opts, RenderOptions::default());
    }

    #[test]
    fn booleans_require_the_literal_one() {
        for value in ["0", "true", "yes", ""] {
            let opts = RenderOptions::from_query(&query(&[("grayscale", value)])).unwrap();
            assert!(!opts.grayscale, "value {value:?} should not enable grayscale");
        }
        let opts = RenderOptions::from_query(&query(&[("grayscale", "1")])).unwrap();
        assert!(opts.grayscale);
    }

    #[test]
    fn negating_flags_disable_defaults() {
        let opts = RenderOptions::from_query(&query(&[
            ("noimages", "1"),
            ("nojavascript", "1"),
            ("shrinking", "1"),
        ]))
        .unwrap();
        assert!(!opts.images);
        assert!(!opts.javascript);
        assert!(!opts.shrinking);

        let args = opts.to_args();
        assert!(args.contains(&"--no-images".to_string()));
        assert!(args.contains(&"--disable-javascript".to_string()));
        assert!(args.contains(&"--disable-smart-shrinking".to_string()));
    }

    #[test]
    fn absent_negating_flags_emit_nothing() {
        let args = RenderOptions::from_query(&query(&[])).unwrap().to_args();
        assert!(!args.contains(&"--no-images".to_string()));
        assert!(!args.contains(&"--disable-javascript".to_string()));
        assert!(!args.contains(&"--disable-smart-shrinking".to_string()));
    }

    #[test]
    fn orientation_mapping() {
        let portrait = RenderOptions::from_query(&query(&[("orientation", "P")])).unwrap();
        assert_eq!(portrait.orientation, Orientation::Portrait);

        let landscape = RenderOptions::from_query(&query(&[("orientation", "L")])).unwrap();
        assert_eq!(landscape.orientation, Orientation::Landscape);

        let empty = RenderOptions::from_query(&query(&[("orientation", "")])).unwrap();
        assert_eq!(empty.orientation, Orientation::Portrait);

        let err = RenderOptions::from_query(&query(&[("orientation", "X")])).unwrap_err();
        assert_eq!(err, OptionsError::Orientation);
        assert_eq!(err.to_string(), "invalid orientation value provided");
    }

    #[test]
    fn malformed_integers_are_rejected() {
        let err = RenderOptions::from_query(&query(&[("imagedpi", "abc")])).unwrap_err();
        assert_eq!(err, OptionsError::Integer("imagedpi"));
        assert_eq!(err.to_string(), "invalid imagedpi value provided");

        let err = RenderOptions::from_query(&query(&[("imagequality", "9x")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid imagequality value provided");
    }

    #[test]
    fn non_positive_integers_are_unset() {
        for value in ["0", "-5"] {
            let opts = RenderOptions::from_query(&query(&[("imagedpi", value)])).unwrap();
            assert_eq!(opts.image_dpi, None);
            assert!(!opts.to_args().contains(&"--image-dpi".to_string()));
        }
    }

    #[test]
    fn positive_integers_are_kept() {
        let opts =
            RenderOptions::from_query(&query(&[("imagedpi", "150"), ("imagequality", "80")]))
                .unwrap();
        assert_eq!(opts.image_dpi, Some(150));
        assert_eq!(opts.image_quality, Some(80));
    }

    #[test]
    fn large_integers_pass_through_verbatim() {
        let opts = RenderOptions::from_query(&query(&[("imagedpi", "4294967297")])).unwrap();
        assert_eq!(opts.image_dpi, Some(4294967297));
        let args = opts.to_args();
        let at = args.iter().position(|a| a == "--image-dpi").unwrap();
        assert_eq!(args[at + 1], "4294967297");
    }

    #[test]
    fn pagesize_defaults_to_a4() {
        let opts = RenderOptions::from_query(&query(&[("pagesize", "")])).unwrap();
        assert_eq!(opts.pagesize, "A4");

        let opts = RenderOptions::from_query(&query(&[("pagesize", "Letter")])).unwrap();
        assert_eq!(opts.pagesize, "Letter");
        let args = opts.to_args();
        let at = args.iter().position(|a| a == "--page-size").unwrap();
        assert_eq!(args[at + 1], "Letter");
    }

    #[test]
    fn margins_and_title_pass_through() {
        let opts = RenderOptions::from_query(&query(&[
            ("marginleft", "10mm"),
            ("margintop", "5mm"),
            ("title", "report"),
        ]))
        .unwrap();
        let args = opts.to_args();
        let at = args.iter().position(|a| a == "--margin-left").unwrap();
        assert_eq!(args[at + 1], "10mm");
        let at = args.iter().position(|a| a == "--margin-top").unwrap();
        assert_eq!(args[at + 1], "5mm");
        let at = args.iter().position(|a| a == "--title").unwrap();
        assert_eq!(args[at + 1], "report");
        assert!(!args.contains(&"--margin-right".to_string()));
        assert!(!args.contains(&"--margin-bottom".to_string()));
    }

    #[test]
    fn default_argument_list() {
        let args = RenderOptions::default().to_args();
        assert_eq!(
            args,
            vec![
                "--encoding",
                "utf-8",
                "--orientation",
                "Portrait",
                "--page-size",
                "A4",
                "--include-in-outline",
                "-",
                "-",
            ]
        );
    }

    #[test]
    fn combined_options_argument_list() {
        let opts = RenderOptions::from_query(&query(&[
            ("grayscale", "1"),
            ("orientation", "L"),
            ("imagedpi", "150"),
        ]))
        .unwrap();
        let args = opts.to_args();
        assert!(args.contains(&"--grayscale".to_string()));
        let at = args.iter().position(|a| a == "--orientation").unwrap();
        assert_eq!(args[at + 1], "Landscape");
        let at = args.iter().position(|a| a == "--image-dpi").unwrap();
        assert_eq!(args[at + 1], "150");
        // flags come before the stdin/stdout placeholders
        assert_eq!(&args[args.len() - 3..], ["--include-in-outline", "-", "-"]);
    }
}
