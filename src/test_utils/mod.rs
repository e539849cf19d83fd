#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use db::{insert_test_user, test_connection_with_user, test_db};
pub(crate) use form::{
    assert_form_input, assert_form_input_with_value, assert_form_submit_button,
    assert_hx_endpoint, field_error, must_get_form,
};
pub(crate) use html::{
    assert_valid_html, body_text, parse_html_document, parse_html_fragment,
};
pub(crate) use http::{assert_hx_redirect, get_header};
