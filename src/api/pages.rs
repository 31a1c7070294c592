//! Server-rendered HTML pages.

pub fn home() -> String {
    r#"<!DOCTYPE html>
<html lang="ar" dir="rtl">
<head>
    <meta charset="utf-8">
    <title>أداة الفحص الأمني المتقدمة</title>
</head>
<body>
    <h1>أداة الفحص الأمني المتقدمة</h1>
    <form id="scanForm">
        <input type="url" id="targetUrl" required placeholder="أدخل الرابط هنا">
        <button type="submit">بدء الفحص</button>
    </form>
    <div id="results"></div>
    <script src="/static/app.js"></script>
</body>
</html>
"#
    .to_string()
}

/// Results page for `scan_id`; its script follows `/ws/<scan_id>`.
pub fn results(scan_id: &str) -> String {
    let html_id = escape_html(scan_id);
    let js_id = serde_json::Value::from(scan_id).to_string();

    format!(
        r#"<!DOCTYPE html>
<html lang="ar" dir="rtl">
<head>
    <meta charset="utf-8">
    <title>نتائج الفحص - {html_id}</title>
</head>
<body>
    <h1>نتائج الفحص</h1>
    <div id="results"></div>
    <script>
        const scanId = {js_id};
        const ws = new WebSocket(`ws://${{window.location.host}}/ws/${{encodeURIComponent(scanId)}}`);
        ws.onmessage = (event) => {{
            const pre = document.createElement('pre');
            pre.textContent = JSON.stringify(JSON.parse(event.data), null, 2);
            document.getElementById('results').replaceChildren(pre);
        }};
    </script>
</body>
</html>
"#,
        js_id = js_id.replace("</", "<\\/"),
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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
    use scraper::{Html, Selector};

    #[test]
    fn home_has_scan_form() {
        let document = Html::parse_document(&home());
        let input = Selector::parse("form#scanForm input#targetUrl").unwrap();
        let element = document.select(&input).next().expect("target url field");
        assert_eq!(element.value().attr("type"), Some("url"));
        assert!(element.value().attr("required").is_some());

        let script = Selector::parse(r#"script[src="/static/app.js"]"#).unwrap();
        assert!(document.select(&script).next().is_some());
    }

    #[test]
    fn results_escapes_scan_id() {
        let page = results("<b>x</b>");
        assert!(page.contains("نتائج الفحص - &lt;b&gt;x&lt;/b&gt;"));
        assert!(page.contains(r#"const scanId = "<b>x<\/b>";"#));
    }
}
