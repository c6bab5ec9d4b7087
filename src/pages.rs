use axum::response::Html;

// Thin static pages; the real surface is the JSON API.

pub async fn home() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Recetario</title></head>
<body>
  <h1>Recetario</h1>
  <p>Recipes live at <code>/api/recipes</code>. <a href="/login">Login</a> · <a href="/logout">Logout</a></p>
</body>
</html>"#,
    )
}

pub fn login_page(error: Option<&str>) -> Html<String> {
    let notice = match error {
        Some(msg) => format!("<p class=\"error\">{msg}</p>"),
        None => String::new(),
    };
    Html(format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Login - Recetario</title></head>
<body>
  <h1>Login</h1>
  {notice}
  <form method="post" action="/login">
    <label>Username <input name="username" autocomplete="username"></label>
    <label>Password <input name="password" type="password" autocomplete="current-password"></label>
    <button type="submit">Sign in</button>
  </form>
</body>
</html>"#
    ))
}
