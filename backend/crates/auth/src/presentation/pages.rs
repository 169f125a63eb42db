//! Minimal HTML pages served by the auth routes

/// Login / registration page. Provider buttons appear only for enabled providers.
pub fn login_page(google_enabled: bool, github_enabled: bool) -> String {
    let mut providers = String::new();
    if google_enabled {
        providers.push_str(r#"<button type="button" data-provider="/auth/google">Continue with Google</button>"#);
    }
    if github_enabled {
        providers.push_str(r#"<button type="button" data-provider="/auth/github">Continue with GitHub</button>"#);
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Login</title>
</head>
<body>
<h1>Login</h1>
<form id="login-form">
  <input name="username" placeholder="Username" autocomplete="username" required>
  <input name="password" type="password" placeholder="Password" autocomplete="current-password" required>
  <button type="submit">Log in</button>
</form>
<h2>Register</h2>
<form id="register-form">
  <input name="email" type="email" placeholder="Email" required>
  <input name="username" placeholder="Username" required>
  <input name="password" type="password" placeholder="Password" autocomplete="new-password" required>
  <button type="submit">Register</button>
</form>
<div id="providers">{providers}</div>
<p id="error" role="alert"></p>
<script>
async function submitJson(url, form) {{
  const body = JSON.stringify(Object.fromEntries(new FormData(form)));
  const res = await fetch(url, {{
    method: "POST",
    credentials: "same-origin",
    redirect: "manual",
    headers: {{ "Content-Type": "application/json", "Accept": "application/json" }},
    body,
  }});
  if (res.type === "opaqueredirect" || res.status === 302) {{
    window.location.href = "/";
    return;
  }}
  const data = await res.json().catch(() => ({{}}));
  document.getElementById("error").textContent = data.error || "Request failed";
}}
for (const [id, url] of [["login-form", "/login"], ["register-form", "/register"]]) {{
  document.getElementById(id).addEventListener("submit", (e) => {{
    e.preventDefault();
    submitJson(url, e.target);
  }});
}}
for (const button of document.querySelectorAll("[data-provider]")) {{
  button.addEventListener("click", () => {{
    window.open(button.dataset.provider, "oauth", "width=500,height=650");
  }});
}}
window.addEventListener("message", (e) => {{
  if (e.origin === window.location.origin && e.data === "oauth-complete") {{
    window.location.href = "/";
  }}
}});
</script>
</body>
</html>"#
    )
}

/// Returned by a provider callback once the session cookie is set.
/// Tells the opener to continue and closes the popup.
pub fn oauth_complete_page() -> &'static str {
    r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Signed in</title>
</head>
<body>
<p>Signed in. You can close this window.</p>
<script>
if (window.opener) {
  window.opener.postMessage("oauth-complete", window.location.origin);
  window.close();
} else {
  window.location.href = "/";
}
</script>
</body>
</html>"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_buttons_follow_config() {
        let page = login_page(true, false);
        assert!(page.contains("/auth/google"));
        assert!(!page.contains("/auth/github"));
        assert!(!login_page(false, false).contains("data-provider=\""));
    }
}
