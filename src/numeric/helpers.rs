/// Text left behind where a rule consumed a span.
pub(crate) const PLACEHOLDER: &str = "#";

/// One numeric operand: optional sign and brackets around digits, hyphens and `+`.
pub(crate) const SPAN: &str = r"[±\[]*\d[\d.\[\]+±\-]*";

/// Canonicalize dashes, brackets and spacing so every rule sees one spelling.
pub(crate) fn normalize(text: &str) -> String {
    let text = text.trim().replace(['–', '—', '‒'], "-").replace('(', "[").replace(')', "]");
    let text = regex!(r"([\d\]])\s+to\s+([\d\[])").replace_all(&text, "${1}-${2}");
    let text = regex!(r"\[\s+").replace_all(&text, "[");
    let text = regex!(r"\s+\]").replace_all(&text, "]");
    let text = regex!(r"\s*-\s*").replace_all(&text, "-");
    let text = regex!(r"\]\s+(\d)").replace_all(&text, "]${1}");
    let text = regex!(r"([\d+])\s+\[").replace_all(&text, "${1}[");

    // "4-5[+]" means "4-5, sometimes more".
    let text = regex!(r"(\d[\d.]*)-(\d[\d.]*)\[\+\]").replace_all(&text, "${1}-${2}[-${2}+]");

    // "1-[4-5]" is a typical run up to the atypical group.
    let text = regex!(r"(\d+)-\[(\d+)-").replace_all(&text, |caps: &regex::Captures| {
        let (Ok(low), Ok(atypical)) = (caps[1].parse::<u64>(), caps[2].parse::<u64>()) else {
            return caps[0].to_string();
        };
        match atypical.checked_sub(1) {
            Some(high) if high > low => format!("{low}-{high}[{atypical}-"),
            _ => format!("{low}[{atypical}-"),
        }
    });

    regex!(r"\s+").replace_all(&text, " ").into_owned()
}

/// Regex alternation over `units`, longest first so `mm` wins over `m`.
pub(crate) fn unit_alternation(units: &[String]) -> String {
    let mut units: Vec<&str> = units.iter().map(|u| u.trim()).filter(|u| !u.is_empty()).collect();
    if units.is_empty() {
        return r"\b\B".to_string();
    }
    units.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    units.dedup();
    units.iter().map(|u| regex::escape(u)).collect::<Vec<_>>().join("|")
}

/// Whether the match starting at byte `start` directly follows a `/`.
pub(crate) fn follows_slash(text: &str, start: usize) -> bool {
    text[..start].ends_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_brackets_and_dashes() {
        let cases: Vec<(&str, &str)> = vec![
            ("[5-]10-15[-20] cm", "(5–)10–15(–20) cm"),
            ("[5-]10-15[-20] cm", "( 5- ) 10 - 15 ( -20 ) cm"),
            ("4-5[-5+]", "4-5[+]"),
            ("1-3[4-5]", "1-[4-5]"),
            ("1[2-5]", "1-[2-5]"),
            ("1/2-2/3 times length of blade", "1/2 to 2/3 times length of blade"),
        ];
        for (expected, input) in cases {
            assert_eq!(normalize(input), expected, "input: {input}");
        }
    }

    #[test]
    fn longest_unit_first() {
        let units: Vec<String> = ["m", "mm", "µm", "cm"].iter().map(|s| s.to_string()).collect();
        assert_eq!(unit_alternation(&units), "cm|mm|µm|m");
    }
}
