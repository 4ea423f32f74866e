use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(element: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let got = element
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("{attribute} attribute missing"));

    assert_eq!(
        got, endpoint,
        "want element with {attribute}=\"{endpoint}\", got {got:?}"
    );
}

#[track_caller]
fn must_find_input<'a>(form: &ElementRef<'a>, name: &str) -> ElementRef<'a> {
    form.select(&Selector::parse("input").unwrap())
        .find(|input| input.value().attr("name") == Some(name))
        .unwrap_or_else(|| panic!("No input found with name \"{name}\""))
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let input = must_find_input(form, name);
    let input_type = input.value().attr("type").unwrap_or_default();

    assert_eq!(
        input_type, type_,
        "want input {name} with type \"{type_}\", got {input_type:?}"
    );
    assert!(
        input.value().attr("required").is_some(),
        "want input with name {name} to have the required attribute but got none"
    );
}

#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    assert_form_input(form, name, type_);

    let input = must_find_input(form, name);
    let input_value = input.value().attr("value").unwrap_or_default();

    assert_eq!(
        input_value, value,
        "want input {name} with value \"{value}\", got {input_value:?}"
    );
}

/// Assert that the form has a select element called `name` whose options
/// have exactly the values in `want_values`, in order.
#[track_caller]
pub(crate) fn assert_form_select(form: &ElementRef<'_>, name: &str, want_values: &[&str]) {
    let select = form
        .select(&Selector::parse("select").unwrap())
        .find(|select| select.value().attr("name") == Some(name))
        .unwrap_or_else(|| panic!("No select found with name \"{name}\""));

    let got_values = select
        .select(&Selector::parse("option").unwrap())
        .map(|option| option.value().attr("value").unwrap_or_default())
        .collect::<Vec<_>>();

    assert_eq!(
        got_values, want_values,
        "unexpected options for select {name}"
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let submit_button = form
        .select(&Selector::parse("button").unwrap())
        .find(|button| button.value().attr("type") == Some("submit"))
        .expect("No submit button found");

    assert!(
        submit_button.text().any(|text| !text.trim().is_empty()),
        "want submit button to have a label"
    );
}

#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want_error_message: &str) {
    let got_error_message = form
        .select(&Selector::parse("p").unwrap())
        .next()
        .expect("No error message found")
        .text()
        .collect::<String>();

    assert_eq!(want_error_message, got_error_message.trim());
}
