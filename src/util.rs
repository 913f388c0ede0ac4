use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn mean(data: &[f64]) -> Option<f64> {
    match data.len() {
        0 => None,
        count => Some(data.iter().sum::<f64>() / count as f64),
    }
}

/// Cut `text` to at most `max_width` terminal columns, marking the cut with `…`.
pub fn fit_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        // one column is reserved for the marker
        if used + w > max_width - 1 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}
