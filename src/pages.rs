//! Server-side page rendering. Plain HTML strings; the markup is
//! deliberately minimal, the behavior lives in the handlers.

use actix_web::{HttpRequest, HttpResponse, http::header::ContentType};

use crate::flash::{self, Flash, FlashKind};
use crate::model::employee::Employee;

fn escape(input: &str) -> String {
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

fn layout(title: &str, flash: Option<&Flash>, body: &str) -> String {
    let banner = match flash {
        Some(f) => {
            let class = match f.kind {
                FlashKind::Success => "flash-success",
                FlashKind::Error => "flash-error",
            };
            format!(r#"<p class="{class}">{}</p>"#, escape(&f.text))
        }
        None => String::new(),
    };

    format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title} - Staffdesk</title></head>\n\
         <body>\n<h1>{title}</h1>\n{banner}\n{body}\n</body>\n</html>\n"
    )
}

/// Renders a page and clears any pending flash cookie.
pub fn respond(req: &HttpRequest, markup: String) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    builder.content_type(ContentType::html());
    if req.cookie(flash::FLASH_COOKIE).is_some() {
        builder.cookie(flash::clear_cookie());
    }
    builder.body(markup)
}

pub fn login(flash: Option<&Flash>) -> String {
    layout(
        "Login",
        flash,
        r#"<form method="post" action="/login">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Login</button>
</form>
<p><a href="/signup">Sign up</a> | <a href="/forgot">Forgot password?</a></p>"#,
    )
}

pub fn signup(flash: Option<&Flash>) -> String {
    layout(
        "Sign up",
        flash,
        r#"<form method="post" action="/signup">
<label>Name <input type="text" name="name" required></label>
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Create account</button>
</form>
<p><a href="/login">Back to login</a></p>"#,
    )
}

pub fn forgot(flash: Option<&Flash>) -> String {
    layout(
        "Recover password",
        flash,
        r#"<form method="post" action="/forgot">
<label>Email <input type="email" name="email" required></label>
<button type="submit">Send recovery email</button>
</form>
<p><a href="/login">Back to login</a></p>"#,
    )
}

pub fn reset(flash: Option<&Flash>, token: &str) -> String {
    let token = escape(token);
    layout(
        "Set a new password",
        flash,
        &format!(
            r#"<form method="post" action="/reset/{token}">
<label>New password <input type="password" name="password" required></label>
<label>Confirm password <input type="password" name="confirmpassword" required></label>
<button type="submit">Change password</button>
</form>"#
        ),
    )
}

pub fn change_password(flash: Option<&Flash>) -> String {
    layout(
        "Change password",
        flash,
        r#"<form method="post" action="/password/change">
<label>New password <input type="password" name="password" required></label>
<label>Confirm password <input type="password" name="confirmpassword" required></label>
<button type="submit">Change password</button>
</form>
<p><a href="/dashboard">Back to dashboard</a></p>"#,
    )
}

pub fn dashboard(flash: Option<&Flash>, employees: &[Employee]) -> String {
    let mut rows = String::new();
    for e in employees {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"/edit/{}\">Edit</a></td>\
             <td><form method=\"post\" action=\"/delete/{}\">\
             <button type=\"submit\">Delete</button></form></td></tr>\n",
            escape(&e.name),
            escape(&e.designation),
            e.salary,
            e.id,
            e.id,
        ));
    }

    let body = format!(
        r#"<nav>
<a href="/employee/new">New employee</a> |
<a href="/employee/search">Search</a> |
<a href="/deleteAll">Delete all</a> |
<a href="/password/change">Change password</a> |
<a href="/logout">Logout</a>
</nav>
<table>
<tr><th>Name</th><th>Designation</th><th>Salary</th><th></th><th></th></tr>
{rows}</table>"#
    );

    layout("Dashboard", flash, &body)
}

pub fn new_employee(flash: Option<&Flash>) -> String {
    layout(
        "New employee",
        flash,
        r#"<form method="post" action="/employee/new">
<label>Name <input type="text" name="name"></label>
<label>Designation <input type="text" name="designation"></label>
<label>Salary <input type="text" name="salary"></label>
<button type="submit">Add employee</button>
</form>
<p><a href="/dashboard">Back to dashboard</a></p>"#,
    )
}

pub fn search(flash: Option<&Flash>, query: &str, result: Option<&Employee>) -> String {
    let result_block = match result {
        Some(e) => format!(
            "<p>{} — {} — {}</p>",
            escape(&e.name),
            escape(&e.designation),
            e.salary
        ),
        None if query.is_empty() => String::new(),
        None => format!("<p>No employee named {}</p>", escape(query)),
    };

    let body = format!(
        r#"<form method="get" action="/employee">
<label>Name <input type="text" name="name" value="{}"></label>
<button type="submit">Search</button>
</form>
{result_block}
<p><a href="/dashboard">Back to dashboard</a></p>"#,
        escape(query),
    );

    layout("Search employees", flash, &body)
}

pub fn edit(flash: Option<&Flash>, employee: &Employee) -> String {
    let body = format!(
        r#"<form method="post" action="/edit/{}">
<label>Name <input type="text" name="name" value="{}"></label>
<label>Designation <input type="text" name="designation" value="{}"></label>
<label>Salary <input type="text" name="salary" value="{}"></label>
<button type="submit">Save</button>
</form>
<p><a href="/dashboard">Back to dashboard</a></p>"#,
        employee.id,
        escape(&employee.name),
        escape(&employee.designation),
        employee.salary,
    );

    layout("Edit employee", flash, &body)
}
