/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Show only the first and last few characters of a token
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

/// Describe minutes left before the backend-reported expiry
pub fn format_expiry(minutes: Option<i64>) -> String {
    match minutes {
        None => "unknown".to_string(),
        Some(m) if m <= 0 => "expired or expiring now".to_string(),
        Some(m) if m < 60 => format!("in {}m", m),
        Some(m) => {
            let hours = m / 60;
            let remaining = m % 60;
            if remaining == 0 {
                format!("in {}h", hours)
            } else {
                format!("in {}h {}m", hours, remaining)
            }
        }
    }
}
