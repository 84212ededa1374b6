mod fields;
mod footer;
mod header;

pub use fields::render_fields;
pub use footer::render_footer;
pub use header::render_header;
