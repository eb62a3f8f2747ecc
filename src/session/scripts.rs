//! Page-side JavaScript
//!
//! Every script evaluated inside a page lives here. Selector and value
//! parameters are embedded as JSON string literals, which handles quoting
//! for free. Scripts that need to distinguish "element missing" from an
//! empty result return a sentinel the caller checks before parsing.

/// Sentinel returned by element scripts when the selector matches nothing
pub const MISSING: &str = "__scout_missing__";

/// Embed a string as a JavaScript string literal
pub fn js_string(value: &str) -> String {
    serde_json::json!(value).to_string()
}

/// Presence probe for a selector
pub fn exists_script(selector: &str) -> String {
    format!(
        "document.querySelector({}) !== null",
        js_string(selector)
    )
}

/// Click the first matching element
pub fn click_script(selector: &str) -> String {
    format!(
        r#"
        (() => {{
            const el = document.querySelector({sel});
            if (!el) return {missing};
            el.scrollIntoView({{ block: 'center' }});
            el.click();
            return 'ok';
        }})()
        "#,
        sel = js_string(selector),
        missing = js_string(MISSING),
    )
}

/// Fill the first matching input
///
/// Uses the prototype value setter and dispatches input/change so that
/// framework-controlled inputs (React et al.) observe the new value.
pub fn fill_script(selector: &str, value: &str) -> String {
    format!(
        r#"
        (() => {{
            const el = document.querySelector({sel});
            if (!el) return {missing};
            el.focus();
            const proto = el instanceof HTMLTextAreaElement
                ? HTMLTextAreaElement.prototype
                : HTMLInputElement.prototype;
            const desc = Object.getOwnPropertyDescriptor(proto, 'value');
            if (desc && desc.set) {{
                desc.set.call(el, {val});
            }} else {{
                el.value = {val};
            }}
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return 'ok';
        }})()
        "#,
        sel = js_string(selector),
        val = js_string(value),
        missing = js_string(MISSING),
    )
}

/// Text content of the first matching element
pub fn text_content_script(selector: &str) -> String {
    format!(
        r#"
        (() => {{
            const el = document.querySelector({sel});
            if (!el) return {missing};
            return el.textContent || '';
        }})()
        "#,
        sel = js_string(selector),
        missing = js_string(MISSING),
    )
}

/// Attribute of the first matching element, JSON-wrapped so that an unset
/// attribute (null) survives the trip
pub fn attribute_script(selector: &str, name: &str) -> String {
    format!(
        r#"
        (() => {{
            const el = document.querySelector({sel});
            if (!el) return {missing};
            return JSON.stringify({{ value: el.getAttribute({name}) }});
        }})()
        "#,
        sel = js_string(selector),
        name = js_string(name),
        missing = js_string(MISSING),
    )
}

/// Visibility of the first matching element
pub fn is_visible_script(selector: &str) -> String {
    format!(
        r#"
        (() => {{
            const el = document.querySelector({sel});
            if (!el) return {missing};
            const style = window.getComputedStyle(el);
            if (style.display === 'none' || style.visibility === 'hidden') return 'false';
            const rect = el.getBoundingClientRect();
            return rect.width > 0 && rect.height > 0 ? 'true' : 'false';
        }})()
        "#,
        sel = js_string(selector),
        missing = js_string(MISSING),
    )
}

/// Text of every matching element, in document order
pub fn matching_text_script(selector: &str) -> String {
    format!(
        r#"
        (() => {{
            const out = [];
            document.querySelectorAll({sel}).forEach((el) => {{
                out.push(el.innerText || el.textContent || '');
            }});
            return JSON.stringify(out);
        }})()
        "#,
        sel = js_string(selector),
    )
}

/// Visible text of the whole document body
pub const BODY_TEXT_SCRIPT: &str = "document.body ? document.body.innerText : ''";

/// Structural page summary script
///
/// Returns JSON matching `PageSummary`: title, URL, meta (name, content)
/// pairs, headings (level, text) in document order, link/image/form counts.
pub const PAGE_SUMMARY_SCRIPT: &str = r#"
(() => {
    const meta = [];
    document.querySelectorAll('meta[name], meta[property]').forEach((tag) => {
        meta.push({
            name: tag.getAttribute('name') || tag.getAttribute('property') || '',
            content: tag.getAttribute('content') || ''
        });
    });

    const headings = [];
    document.querySelectorAll('h1, h2, h3, h4, h5, h6').forEach((h) => {
        headings.push({
            level: parseInt(h.tagName.substring(1), 10),
            text: (h.textContent || '').trim().substring(0, 200)
        });
    });

    return JSON.stringify({
        title: document.title || '',
        url: window.location.href,
        meta: meta,
        headings: headings,
        links: document.querySelectorAll('a[href]').length,
        images: document.querySelectorAll('img').length,
        forms: document.querySelectorAll('form').length
    });
})()
"#;

/// Performance metrics script
///
/// Reads the Navigation Timing and Paint Timing entries. Metrics the engine
/// does not expose are simply omitted from the returned object.
pub const PERFORMANCE_SCRIPT: &str = r#"
(() => {
    const out = {};
    if (window.performance && typeof performance.getEntriesByType === 'function') {
        const nav = performance.getEntriesByType('navigation')[0];
        if (nav) {
            if (nav.domContentLoadedEventEnd > 0) {
                out.dom_content_loaded_ms = nav.domContentLoadedEventEnd - nav.startTime;
            }
            if (nav.loadEventEnd > 0) {
                out.load_complete_ms = nav.loadEventEnd - nav.startTime;
            }
        }
        performance.getEntriesByType('paint').forEach((entry) => {
            if (entry.name === 'first-paint') out.first_paint_ms = entry.startTime;
            if (entry.name === 'first-contentful-paint') out.first_contentful_paint_ms = entry.startTime;
        });
    }
    return JSON.stringify(out);
})()
"#;
