//! Server-rendered HTML views

use axum::response::Html;

use metered_billing::{FEATURE_CONVERT, Plan, dollars};
use metered_core::NewUserErrors;
use metered_payments::CustomerSummary;

const TITLE: &str = "Tier.run Rust Demo";

/// Escape text for an HTML body or a double-quoted attribute
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

fn layout(heading: &str, nav: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{TITLE}</title>
<link rel="stylesheet" href="/style.css">
</head>
<body>
<header><h1>{heading}</h1><nav>{nav}</nav></header>
<main>
{body}
</main>
</body>
</html>
"#,
        heading = escape(heading),
    ))
}

const SIGNED_OUT_NAV: &str = r#"<a href="/login">Log in</a> <a href="/signup">Sign up</a> <a href="/pricing">Pricing</a>"#;

const SIGNED_IN_NAV: &str = r#"<a href="/app">Converter</a> <a href="/pricing">Pricing</a> <a href="/payment">Payment</a> <a href="/logout">Log out</a>"#;

fn field_error(message: Option<&str>) -> String {
    message.map_or_else(String::new, |m| {
        format!(r#"<p class="error">{}</p>"#, escape(m))
    })
}

pub fn login(error: Option<&str>) -> Html<String> {
    let body = format!(
        r#"{error}<form method="post" action="/login">
<label>Username <input name="user" autocomplete="username"></label>
<label>Password <input name="pass" type="password" autocomplete="current-password"></label>
<button type="submit">Log in</button>
</form>
<p>No account? <a href="/signup">Sign up</a>.</p>"#,
        error = field_error(error),
    );
    layout("Log in", SIGNED_OUT_NAV, &body)
}

/// Signup form, refilled with what the user typed
pub fn signup(errors: &NewUserErrors, user: &str, pass: &str) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/signup">
<label>Username <input name="user" value="{user}" autocomplete="username"></label>
{user_error}
<label>Password <input name="pass" type="password" value="{pass}" autocomplete="new-password"></label>
{pass_error}
<button type="submit">Sign up</button>
</form>"#,
        user = escape(user),
        pass = escape(pass),
        user_error = field_error(errors.username.as_deref()),
        pass_error = field_error(errors.password.as_deref()),
    );
    layout("Sign up", SIGNED_OUT_NAV, &body)
}

const CONVERTER_SCRIPT: &str = r#"<script>
const form = document.getElementById("convert");
const output = document.getElementById("result");
form.addEventListener("submit", async (event) => {
  event.preventDefault();
  const unit = form.elements.unit.value;
  const raw = form.elements.temp.value;
  const body = raw === "" ? {} : { [unit]: Number(raw) };
  const res = await fetch("/convert", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify(body),
  });
  const data = await res.json();
  if (res.status === 402) {
    output.innerHTML = 'Limit reached (' + data.used + '/' + data.limit + '). <a href="/pricing">Upgrade</a>';
  } else if (!res.ok) {
    output.textContent = data.error;
  } else if ("F" in data) {
    output.textContent = data.F.toFixed(1) + " °F";
  } else {
    output.textContent = data.C.toFixed(1) + " °C";
  }
});
</script>"#;

/// The converter shell
pub fn app(user: &str, plan_hint: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<p>Signed in as <strong>{user}</strong>{plan}.</p>
<form id="convert">
<input name="temp" type="number" step="any" placeholder="Temperature">
<select name="unit"><option value="C">°C → °F</option><option value="F">°F → °C</option></select>
<button type="submit">Convert</button>
</form>
<p id="result"></p>
{CONVERTER_SCRIPT}"#,
        user = escape(user),
        plan = plan_hint.map_or_else(String::new, |p| format!(" on <code>{}</code>", escape(p))),
    );
    layout("Temperature converter", SIGNED_IN_NAV, &body)
}

fn feature_line(feature: &str, limit: Option<u64>) -> String {
    let name = if feature == FEATURE_CONVERT { "Conversions" } else { feature };
    match limit {
        Some(n) => format!("<li>{}: {n}</li>", escape(name)),
        None => format!("<li>{}: unlimited</li>", escape(name)),
    }
}

/// Plan list in the order given, with a subscribe button on every plan but
/// the current one
pub fn pricing(plans: &[Plan], current: Option<&str>, signed_in: bool) -> Html<String> {
    let mut body = String::from(r#"<div class="plans">"#);
    for plan in plans {
        let features: String = plan
            .features
            .iter()
            .map(|(feature, terms)| feature_line(feature, terms.limit()))
            .collect();
        let action = if current == Some(plan.id.as_str()) {
            r#"<p class="current">Current plan</p>"#.to_string()
        } else if signed_in {
            format!(
                r#"<form method="post" action="/plan"><input type="hidden" name="plan" value="{}"><button type="submit">Choose</button></form>"#,
                escape(&plan.id)
            )
        } else {
            String::new()
        };
        body.push_str(&format!(
            r#"
<section class="plan" data-plan="{id}">
<h2>{name}</h2>
<p class="price">{price}</p>
<ul>{features}</ul>
{action}
</section>"#,
            id = escape(&plan.id),
            name = escape(plan.display_name()),
            price = dollars(plan.base_price_cents()),
        ));
    }
    body.push_str("\n</div>");

    let nav = if signed_in { SIGNED_IN_NAV } else { SIGNED_OUT_NAV };
    layout("Pricing", nav, &body)
}

/// Data the payment page hands to Stripe.js
pub struct PaymentView<'a> {
    pub customer: &'a CustomerSummary,
    pub publishable_key: &'a str,
    pub client_secret: &'a str,
    pub return_url: &'a str,
}

const PAYMENT_SCRIPT: &str = r#"<script src="https://js.stripe.com/v3/"></script>
<script>
const mount = document.getElementById("payment-element");
const stripe = Stripe(mount.dataset.key);
const elements = stripe.elements({ clientSecret: mount.dataset.secret });
elements.create("payment").mount(mount);
document.getElementById("payment-form").addEventListener("submit", async (event) => {
  event.preventDefault();
  const { error } = await stripe.confirmSetup({
    elements,
    confirmParams: { return_url: mount.dataset.return },
  });
  if (error) document.getElementById("payment-error").textContent = error.message;
});
</script>"#;

pub fn payment(view: &PaymentView<'_>) -> Html<String> {
    let current = view
        .customer
        .default_payment_method
        .as_ref()
        .map_or_else(|| "none".to_string(), |pm| escape(&pm.label()));
    let who = view
        .customer
        .email
        .as_deref()
        .or(view.customer.name.as_deref())
        .unwrap_or(&view.customer.id);

    let body = format!(
        r#"<p>Customer: {who}</p>
<p>Default payment method: <strong>{current}</strong></p>
<form id="payment-form">
<div id="payment-element" data-key="{key}" data-secret="{secret}" data-return="{ret}"></div>
<button type="submit">Save payment method</button>
<p id="payment-error" class="error"></p>
</form>
{PAYMENT_SCRIPT}"#,
        who = escape(who),
        key = escape(view.publishable_key),
        secret = escape(view.client_secret),
        ret = escape(view.return_url),
    );
    layout("Payment method", SIGNED_IN_NAV, &body)
}
