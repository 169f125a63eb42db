//! HTML rendering

use platform::middleware::ErrorPage;

use crate::domain::post::Post;

/// Renderer handed to the platform error-page and path/method middleware
pub fn render_error_page(page: &ErrorPage) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{code} {title}</title>
</head>
<body>
<main class="error-page">
  <h1>{code}</h1>
  <h2>{title}</h2>
  <p>{message}</p>
  <a href="/">Back to home</a>
</main>
</body>
</html>"#,
        code = page.code,
        title = page.title,
        message = page.message,
    )
}

/// Home page. `csrf_token` is present only for a signed-in visitor.
pub fn home_page(posts: &[Post], csrf_token: Option<&str>) -> String {
    let csrf = csrf_token.unwrap_or_default();
    let signed_in = csrf_token.is_some();

    let meta = if signed_in {
        format!(r#"<meta name="csrf-token" content="{csrf}">"#)
    } else {
        String::new()
    };

    let nav = if signed_in {
        r#"<button type="button" id="logout">Log out</button>"#
    } else {
        r#"<a href="/login_Page">Log in</a>"#
    };

    let mut items = String::new();
    for post in posts {
        // escaped by NewPost::sanitized on insert
        items.push_str(&format!(
            r#"<article data-post="{id}">
  <h2>{title}</h2>
  <p>{content}</p>
  <form class="vote-form" method="post" action="/likePost">
    <input type="hidden" name="csrf_token" value="{csrf}">
    <input type="hidden" name="post_id" value="{id}">
    <button type="submit" name="vote" value="like">Like <span class="likes">{likes}</span></button>
    <button type="submit" name="vote" value="dislike">Dislike <span class="dislikes">{dislikes}</span></button>
  </form>
</article>
"#,
            id = post.id,
            title = post.title,
            content = post.content,
            likes = post.likes,
            dislikes = post.dislikes,
        ));
    }
    if posts.is_empty() {
        items.push_str("<p>No posts yet.</p>");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
{meta}
<title>Forum</title>
</head>
<body>
<header><h1>Forum</h1>{nav}</header>
<main>
{items}</main>
<script>
const meta = document.querySelector('meta[name="csrf-token"]');
for (const form of document.querySelectorAll(".vote-form")) {{
  form.addEventListener("submit", async (e) => {{
    e.preventDefault();
    if (!meta) {{ window.location.href = "/login_Page"; return; }}
    const data = new URLSearchParams(new FormData(form));
    data.set("vote", e.submitter.value);
    const res = await fetch("/likePost", {{
      method: "POST",
      credentials: "same-origin",
      headers: {{ "X-CSRF-Token": meta.content, "Accept": "application/json" }},
      body: data,
    }});
    if (!res.ok) return;
    const counts = await res.json();
    form.querySelector(".likes").textContent = counts.likes;
    form.querySelector(".dislikes").textContent = counts.dislikes;
  }});
}}
const logout = document.getElementById("logout");
if (logout) {{
  logout.addEventListener("click", async () => {{
    await fetch("/logout", {{
      method: "POST",
      credentials: "same-origin",
      headers: {{ "X-CSRF-Token": meta ? meta.content : "", "Accept": "application/json" }},
    }});
    window.location.href = "/";
  }});
}}
</script>
</body>
</html>"#
    )
}
