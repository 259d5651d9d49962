//! Reusable mockup content.

/// A page with two named sections
pub const HOME_HTML: &str = r#"<html>
<head><title>Home</title></head>
<body>
<main>
  <header data-component="hero"><h1>Welcome</h1></header>
  <section data-component="features"><p>Fast</p></section>
</main>
</body>
</html>
"#;

/// A page with no named sections
pub const ABOUT_HTML: &str = r#"<html>
<body>
<main><h1>About us</h1></main>
</body>
</html>
"#;

/// Same page as `ABOUT_HTML` with changed copy
pub const ABOUT_HTML_V2: &str = r#"<html>
<body>
<main><h1>About the team</h1></main>
</body>
</html>
"#;

pub const CART_HTML: &str = r#"<html>
<body>
<main><h1>Cart</h1></main>
</body>
</html>
"#;

pub const CART_MOBILE_HTML: &str = r#"<html>
<body>
<main><h1>Cart (mobile)</h1></main>
</body>
</html>
"#;
