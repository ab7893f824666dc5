//! Page shells for the browser client.
//!
//! Each page is a static HTML document naming the client component to mount
//! plus its initial props as JSON. Admin shells carry no data: the client
//! fetches it through the token-protected API.

use axum::{extract::State, response::Html};
use serde_json::{json, Value};

use crate::error::Result;
use crate::services::StatsService;
use crate::AppState;

/// GET /
pub async fn home(State(state): State<AppState>) -> Result<Html<String>> {
    let count = StatsService::download_count(&state.db, &state.config.app.name).await?;
    Ok(render_page(&state, "Home", json!({ "downloadCount": count })))
}

/// GET /about
pub async fn about(State(state): State<AppState>) -> Html<String> {
    render_page(&state, "About", json!({}))
}

/// GET /download
pub async fn download(State(state): State<AppState>) -> Result<Html<String>> {
    let count = StatsService::download_count(&state.db, &state.config.app.name).await?;
    Ok(render_page(&state, "Download", json!({ "downloadCount": count })))
}

/// GET /admin/login
pub async fn admin_login(State(state): State<AppState>) -> Html<String> {
    render_page(&state, "Admin/Login", json!({}))
}

/// GET /admin/dashboard
pub async fn admin_dashboard(State(state): State<AppState>) -> Html<String> {
    render_page(&state, "Admin/Dashboard", json!({}))
}

/// GET /admin/withdrawals
pub async fn admin_withdrawals(State(state): State<AppState>) -> Html<String> {
    render_page(&state, "Admin/Withdrawals", json!({}))
}

/// GET /admin/users
pub async fn admin_users(State(state): State<AppState>) -> Html<String> {
    render_page(&state, "Admin/Users", json!({}))
}

/// GET /admin/settings
pub async fn admin_settings(State(state): State<AppState>) -> Html<String> {
    render_page(&state, "Admin/Settings", json!({}))
}

/// GET /admin/team
pub async fn admin_team(State(state): State<AppState>) -> Html<String> {
    render_page(&state, "Admin/Team", json!({}))
}

fn render_page(state: &AppState, component: &str, props: Value) -> Html<String> {
    let page = json!({ "component": component, "props": props });
    // `<` cannot appear raw inside a script element
    let page = page.to_string().replace('<', "\\u003c");
    let title = escape_html(&state.config.app.display_name);

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/assets/app.css">
</head>
<body>
<div id="app"></div>
<script type="application/json" id="page">{page}</script>
<script type="module" src="/assets/app.js"></script>
</body>
</html>
"#
    ))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<b>"R&D"</b>"#), "&lt;b&gt;&quot;R&amp;D&quot;&lt;/b&gt;");
    }
}
