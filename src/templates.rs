//! Server-rendered page for the transaction feed.
//!
//! Every function returns a `String` ready for an axum `Html` response. All
//! values that come from providers or the query string go through `escape`.

use crate::models::{DomainListing, TransactionRecord};

pub struct PageView<'a> {
    pub query: &'a str,
    pub loading: bool,
    pub transactions: &'a [&'a TransactionRecord],
    pub tokens: &'a [String],
    pub selected_token: Option<&'a str>,
    pub refresh_secs: u64,
    pub listing: &'a DomainListing,
}

pub fn render_page(view: &PageView<'_>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>WhaleWatch.live</title>
    <style>
        {styles}
    </style>
</head>
<body>
    <div class="app-container">
        <header class="header">
            <h1>WhaleWatch.live</h1>
            <p class="tagline">Real-time crypto whale tracking</p>
            <form class="filter" method="get" action="/">
                <input type="text" name="q" value="{query}" placeholder="Filter by token, from or to">
            </form>
            <nav class="tokens">
                {tokens}
            </nav>
        </header>

        <section class="feed">
            {feed}
        </section>

        <footer class="footer">
            <p class="note">Data refreshes every {refresh} seconds. Reach out on Twitter for feedback or inquiries.</p>
            <a href="{feedback_url}" target="_blank" rel="noopener noreferrer">{feedback_label}</a>
        </footer>
    </div>

    {listing}

    <script>
        {scripts}
    </script>
</body>
</html>"#,
        styles = styles(),
        query = escape(view.query),
        tokens = token_buttons(view.tokens, view.selected_token),
        feed = feed(view),
        refresh = view.refresh_secs,
        feedback_url = escape(&view.listing.feedback.url),
        feedback_label = escape(&view.listing.feedback.label),
        listing = listing_card(view.listing),
        scripts = scripts(),
    )
}

fn feed(view: &PageView<'_>) -> String {
    if view.loading {
        return r#"<p class="loading">Loading...</p>"#.to_string();
    }

    if view.transactions.is_empty() {
        return r#"<p class="empty">No transactions match this filter.</p>"#.to_string();
    }

    view.transactions
        .iter()
        .map(|tx| transaction_row(tx))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn transaction_row(tx: &TransactionRecord) -> String {
    let observed = tx
        .observed_at
        .as_deref()
        .map(|t| format!(r#" <span class="time">{}</span>"#, escape(t)))
        .unwrap_or_default();

    format!(
        r#"<div class="row">
                <div><span class="symbol">{symbol}</span> {amount} from {sender} to {receiver}{observed}</div>
                <a href="{url}" target="_blank" rel="noopener noreferrer">View</a>
            </div>"#,
        symbol = escape(&tx.symbol),
        amount = tx.amount,
        sender = escape(&tx.sender),
        receiver = escape(&tx.receiver),
        observed = observed,
        url = escape(&tx.explorer_url()),
    )
}

fn token_buttons(tokens: &[String], selected: Option<&str>) -> String {
    tokens
        .iter()
        .map(|token| {
            let class = if Some(token.as_str()) == selected {
                "token active"
            } else {
                "token"
            };
            format!(
                r#"<button class="{class}" data-token="{token}">{token}</button>"#,
                class = class,
                token = escape(token),
            )
        })
        .collect::<Vec<_>>()
        .join("\n                ")
}

fn listing_card(listing: &DomainListing) -> String {
    let contacts = listing
        .contacts
        .iter()
        .map(|c| {
            format!(
                r#"<a class="contact" href="{}" target="_blank" rel="noreferrer">{}</a>"#,
                escape(&c.url),
                escape(&c.label)
            )
        })
        .collect::<Vec<_>>()
        .join("\n                ");

    format!(
        r#"<div id="listing" class="listing">
        <button class="dismiss" data-action="close-card">&times;</button>
        <h3>This web app is for sale: <span class="domain">{domain}</span></h3>
        <p class="includes">{includes} <a href="{profile_url}" target="_blank" rel="noopener noreferrer">{profile_label}</a></p>
        <p>{description}</p>
        <p class="price">${price}</p>
        <button class="buy" data-action="open-modal">Buy Now</button>
        <p class="broker">By <a href="{broker_url}" target="_blank" rel="noreferrer">{broker_label}</a></p>
    </div>

    <div id="contact-modal" class="modal hidden">
        <div class="modal-content">
            <h3>Contact to buy {domain}</h3>
            <p>Select a contact option:</p>
            <div class="contacts">
                {contacts}
                <button class="close" data-action="close-modal">Close</button>
            </div>
        </div>
    </div>"#,
        domain = escape(&listing.domain),
        includes = escape(&listing.includes),
        profile_url = escape(&listing.profile.url),
        profile_label = escape(&listing.profile.label),
        description = escape(&listing.description),
        price = listing.price_usd,
        broker_url = escape(&listing.broker.url),
        broker_label = escape(&listing.broker.label),
        contacts = contacts,
    )
}

fn styles() -> &'static str {
    r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #0b1120; color: #f8fafc; }
        .header { text-align: center; padding: 64px 16px 32px; }
        .header h1 { font-size: 3em; margin-bottom: 16px; }
        .tagline { color: #cbd5e1; font-size: 1.25em; margin-bottom: 32px; }
        .filter input { width: 100%; max-width: 28rem; padding: 10px 14px; border-radius: 8px; border: 1px solid #334155; background: #1e293b; color: #f8fafc; }
        .tokens { margin-top: 16px; display: flex; gap: 8px; justify-content: center; flex-wrap: wrap; }
        .token { padding: 6px 12px; border-radius: 6px; border: 1px solid #334155; background: #1e293b; color: #f8fafc; cursor: pointer; }
        .token.active { background: #3b82f6; border-color: #3b82f6; }
        .feed { max-width: 48rem; margin: 0 auto; padding: 0 16px; }
        .row { display: flex; justify-content: space-between; align-items: center; border-bottom: 1px solid #374151; padding: 8px 0; }
        .row a { color: #60a5fa; text-decoration: underline; }
        .symbol { font-weight: 600; }
        .time { color: #94a3b8; font-size: 0.85em; margin-left: 8px; }
        .loading, .empty { text-align: center; color: #9ca3af; }
        .footer { text-align: center; color: #9ca3af; font-size: 0.875em; margin: 64px 0 32px; }
        .footer .note { font-style: italic; margin-bottom: 16px; }
        .footer a { color: #f8fafc; }
        .listing { position: fixed; top: 32px; right: 32px; width: 25%; min-width: 280px; padding: 24px; background: rgba(31, 41, 55, 0.8); border-radius: 12px; }
        .listing .domain { color: #60a5fa; font-family: monospace; }
        .listing .includes { font-style: italic; font-size: 0.875em; margin: 8px 0 16px; }
        .listing .price { font-size: 1.125em; font-weight: 700; margin: 16px 0; }
        .listing .buy { background: #3b82f6; color: #fff; padding: 8px 16px; border: none; border-radius: 8px; cursor: pointer; }
        .listing .dismiss { position: absolute; top: 8px; right: 8px; background: none; border: none; color: #fff; font-size: 1.25em; cursor: pointer; }
        .listing .broker { margin-top: 16px; text-align: center; }
        .modal { position: fixed; inset: 0; background: rgba(0, 0, 0, 0.5); display: flex; justify-content: center; align-items: center; z-index: 50; }
        .modal-content { background: #111827; padding: 24px; border-radius: 12px; }
        .contacts { display: flex; flex-direction: column; gap: 16px; margin-top: 16px; }
        .contact { background: #2563eb; color: #fff; text-align: center; padding: 8px 16px; border-radius: 8px; text-decoration: none; }
        .close { background: #dc2626; color: #fff; padding: 8px 16px; border: none; border-radius: 8px; }
        .hidden { display: none; }
        @media (max-width: 640px) {
            .listing { left: 0; right: 0; width: 100%; border-radius: 0; top: 0; }
        }
    "#
}

// Overlay and modal state lives only in the browser
fn scripts() -> &'static str {
    r#"
        const listing = document.getElementById('listing');
        const modal = document.getElementById('contact-modal');
        document.addEventListener('click', async (event) => {
            const action = event.target.dataset.action;
            if (action === 'close-card') listing.remove();
            if (action === 'open-modal') modal.classList.remove('hidden');
            if (action === 'close-modal') modal.classList.add('hidden');

            const token = event.target.dataset.token;
            if (token) {
                await fetch('/api/tokens/' + encodeURIComponent(token), { method: 'POST' });
                window.location.reload();
            }
        });
    "#
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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
