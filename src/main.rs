#[macro_use]
extern crate rocket;

use rocket::response::content::RawHtml;
use rocket_dyn_templates::Template;

mod backup;
mod boot;
mod config;
mod hosting;
mod mailer;
mod routes;
mod workflow;


#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page not found.</p><a href='/'>← Home</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>Internal server error.</p><a href='/'>← Home</a></body></html>".to_string())
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let config = config::AppConfig::from_env();

    // Boot check — verify/create directories, validate critical files
    boot::run(&config);

    rocket::build()
        .manage(config)
        .attach(Template::fairing())
        .mount("/", routes::routes())
        .register("/", catchers![not_found, server_error])
}
