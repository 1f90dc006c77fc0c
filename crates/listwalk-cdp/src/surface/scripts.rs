//! Page-side function declarations run through `Runtime.callFunctionOn`.
//! `this` is the element the call targets.

pub(super) const TEXT: &str = r#"function(part) {
    const el = part ? this.querySelector(part) : this;
    if (!el) return null;
    return (el.innerText || el.textContent || '').trim();
}"#;

pub(super) const GET_ATTRIBUTE: &str = r#"function(name) {
    return this.getAttribute(name);
}"#;

pub(super) const SET_ATTRIBUTE: &str = r#"function(name, value) {
    this.setAttribute(name, value);
}"#;

pub(super) const SCROLL_INTO_VIEW: &str = r#"function() {
    this.scrollIntoView({ block: 'nearest', inline: 'nearest' });
}"#;

/// Dispatches synthetic enter/leave events on the target and returns its
/// center so a real mouse move can follow.
pub(super) const POINTER: &str = r#"function(target, kind) {
    const el = (target && this.querySelector(target)) || this;
    const r = el.getBoundingClientRect();
    const x = r.left + r.width / 2;
    const y = r.top + r.height / 2;
    const names = kind === 'enter'
        ? ['pointerover', 'pointerenter', 'mouseover', 'mouseenter']
        : ['pointerout', 'pointerleave', 'mouseout', 'mouseleave'];
    for (const name of names) {
        const bubbles = !name.endsWith('enter') && !name.endsWith('leave');
        const Ctor = name.startsWith('pointer') && typeof PointerEvent === 'function'
            ? PointerEvent : MouseEvent;
        el.dispatchEvent(new Ctor(name, { bubbles, cancelable: true, clientX: x, clientY: y }));
    }
    return { x, y };
}"#;

pub(super) const REGION_TEXT: &str = r#"function(region, tooltip) {
    const root = (region && this.closest(region)) || this;
    const parts = [root.innerText || root.textContent || ''];
    for (const el of [root, ...root.querySelectorAll('[title],[aria-label]')]) {
        for (const attr of ['title', 'aria-label']) {
            const v = el.getAttribute(attr);
            if (v) parts.push(v);
        }
    }
    if (tooltip) {
        for (const t of document.querySelectorAll(tooltip)) {
            parts.push(t.innerText || t.textContent || '');
        }
    }
    return parts.join('\n');
}"#;

/// Candidate position values, nearest element first.
pub(super) const POSITION_CANDIDATES: &str = r#"function(attrs) {
    const out = [];
    let el = this;
    for (let depth = 0; el && el.getAttribute && depth < 4; depth++) {
        for (const attr of attrs) {
            const v = el.getAttribute(attr);
            if (v !== null && v !== '') out.push(v);
        }
        el = el.parentElement;
    }
    return out;
}"#;

pub(super) const SCROLL_TOP: &str = r#"function() {
    return this.scrollTop;
}"#;

pub(super) const SET_SCROLL_TOP: &str = r#"function(top) {
    this.scrollTop = top;
}"#;

pub(super) const GEOMETRY: &str = r#"function() {
    const r = this.getBoundingClientRect();
    return {
        left: r.left, top: r.top, width: r.width, height: r.height,
        viewportWidth: window.innerWidth, viewportHeight: window.innerHeight,
    };
}"#;

/// First element matching the selector that actually overflows.
pub(super) fn overflowing_match(selector_json: &str) -> String {
    format!(
        r#"(() => {{
    for (const el of document.querySelectorAll({selector_json})) {{
        if (el.scrollHeight > el.clientHeight) return el;
    }}
    return null;
}})()"#
    )
}

/// First scrollable `overflow-y: auto|scroll` element holding list items.
pub(super) fn overflow_scan(item_selector_json: &str) -> String {
    format!(
        r#"(() => {{
    for (const el of document.querySelectorAll('*')) {{
        const oy = getComputedStyle(el).overflowY;
        if ((oy === 'auto' || oy === 'scroll')
            && el.scrollHeight > el.clientHeight
            && el.querySelector({item_selector_json})) return el;
    }}
    return null;
}})()"#
    )
}

pub(super) const DOCUMENT_SCROLLER: &str =
    "document.scrollingElement || document.documentElement";
