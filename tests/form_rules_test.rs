use form_visibility::{ControllerConfig, Error, Page};

const SUPPLIER_FORM: &str = r#"
<form id="licence">
  <fieldset>
    <label><input type="radio" name="alcoholSupplier" id="alcoholSupplier-yes" value="yes"> Yes</label>
    <label><input type="radio" name="alcoholSupplier" id="alcoholSupplier-no" value="no"> No</label>
  </fieldset>
  <div id="alcoholSupplier-yes-content">
    <input type="text" id="supplier-licence" name="supplierLicence">
  </div>
  <div id="alcoholSupplier-no-content">
    <input type="text" id="no-reason" name="noReason" value="not yet">
    <label><input type="checkbox" id="no-confirm" name="noConfirm" checked> I confirm</label>
  </div>
  <div id="supplier">
    <input type="text" id="supplier-name" name="supplierName">
  </div>
</form>
"#;

const COLORS_FORM: &str = r#"
<form id="prefs">
  <label><input type="checkbox" name="colors" id="colors-all" value="all"> All colours</label>
  <label><input type="checkbox" name="colors" id="red" value="red"> Red</label>
  <label><input type="checkbox" name="colors" id="green" value="green"> Green</label>
  <label><input type="checkbox" name="colors" id="blue" value="blue"> Blue</label>
  <label><input type="checkbox" name="colors" id="colors_99" value="99"> Other</label>
  <div id="other-colors">
    <input type="text" id="colors-other-text" name="colorsOther" value="teal">
  </div>
</form>
"#;

#[test]
fn unanswered_group_hides_both_panes_and_linked_pane() -> form_visibility::Result<()> {
    let page = Page::from_html(SUPPLIER_FORM)?;
    page.assert_hidden("#alcoholSupplier-yes-content")?;
    page.assert_hidden("#alcoholSupplier-no-content")?;
    page.assert_hidden("#supplier")?;
    // Hiding an unanswered group does not clear anything.
    page.assert_value("#no-reason", "not yet")?;
    page.assert_checked("#no-confirm", true)?;
    Ok(())
}

#[test]
fn answering_yes_shows_yes_and_linked_pane_and_clears_no() -> form_visibility::Result<()> {
    let mut page = Page::from_html(SUPPLIER_FORM)?;
    page.click("#alcoholSupplier-yes")?;

    page.assert_visible("#alcoholSupplier-yes-content")?;
    page.assert_visible("#supplier")?;
    page.assert_hidden("#alcoholSupplier-no-content")?;
    page.assert_value("#no-reason", "")?;
    page.assert_checked("#no-confirm", false)?;
    Ok(())
}

#[test]
fn switching_to_no_hides_and_clears_yes_side() -> form_visibility::Result<()> {
    let mut page = Page::from_html(SUPPLIER_FORM)?;
    page.click("#alcoholSupplier-yes")?;
    page.type_text("#supplier-licence", "LIC-42")?;
    page.type_text("#supplier-name", "Cellar Ltd")?;

    page.click("#alcoholSupplier-no")?;
    page.assert_checked("#alcoholSupplier-yes", false)?;
    page.assert_visible("#alcoholSupplier-no-content")?;
    page.assert_hidden("#alcoholSupplier-yes-content")?;
    page.assert_hidden("#supplier")?;
    page.assert_value("#supplier-licence", "")?;
    // The linked pane is hidden but its inputs are left alone.
    page.assert_value("#supplier-name", "Cellar Ltd")?;
    Ok(())
}

#[test]
fn cleared_linked_panes_leave_supplier_alone() -> form_visibility::Result<()> {
    let mut page = Page::with_config(
        SUPPLIER_FORM,
        ControllerConfig::new().clear_linked_panes(),
    )?;
    page.assert_visible("#supplier")?;
    page.click("#alcoholSupplier-no")?;
    page.assert_visible("#supplier")?;
    Ok(())
}

#[test]
fn linked_pane_table_accepts_other_groups() -> form_visibility::Result<()> {
    let html = r#"
    <input type="radio" name="pets" id="pets-yes">
    <input type="radio" name="pets" id="pets-no">
    <div id="vet">vet details</div>
    "#;
    let mut page = Page::with_config(html, ControllerConfig::new().linked_pane("pets", "vet"))?;
    page.assert_hidden("#vet")?;
    page.click("#pets-yes")?;
    page.assert_visible("#vet")?;
    Ok(())
}

#[test]
fn restored_answer_is_honoured_at_initialization() -> form_visibility::Result<()> {
    let html = SUPPLIER_FORM.replace(
        r#"id="alcoholSupplier-no" value="no""#,
        r#"id="alcoholSupplier-no" value="no" checked"#,
    );
    let page = Page::from_html(&html)?;
    page.assert_visible("#alcoholSupplier-no-content")?;
    page.assert_hidden("#alcoholSupplier-yes-content")?;
    page.assert_hidden("#supplier")?;
    page.assert_value("#no-reason", "not yet")?;
    Ok(())
}

#[test]
fn rules_are_idempotent() -> form_visibility::Result<()> {
    let mut page = Page::from_html(SUPPLIER_FORM)?;
    page.click("#alcoholSupplier-yes")?;
    page.type_text("#supplier-licence", "LIC-42")?;
    let before = page.dump_dom("#licence")?;

    page.apply_radio_visibility("alcoholSupplier")?;
    page.apply_radio_visibility("alcoholSupplier")?;
    page.initialize()?;

    assert_eq!(page.dump_dom("#licence")?, before);
    page.assert_value("#supplier-licence", "LIC-42")?;
    page.assert_visible("#alcoholSupplier-yes-content")?;
    Ok(())
}

#[test]
fn other_checkbox_toggles_its_pane_and_clears_on_uncheck() -> form_visibility::Result<()> {
    let mut page = Page::from_html(COLORS_FORM)?;
    page.assert_hidden("#other-colors")?;
    // Initialization hides an unchecked pane and empties it.
    page.assert_value("#colors-other-text", "")?;

    page.click("#colors_99")?;
    page.assert_visible("#other-colors")?;
    page.type_text("#colors-other-text", "teal")?;

    page.click("#colors_99")?;
    page.assert_hidden("#other-colors")?;
    page.assert_value("#colors-other-text", "")?;
    Ok(())
}

#[test]
fn other_checkbox_is_not_a_group_member() -> form_visibility::Result<()> {
    let mut page = Page::from_html(COLORS_FORM)?;
    page.click("#red")?;
    page.click("#green")?;
    page.click("#blue")?;
    page.assert_checked("#colors_99", false)?;
    page.assert_checked("#colors-all", true)?;

    page.click("#colors-all")?;
    page.assert_checked("#colors_99", false)?;
    Ok(())
}

#[test]
fn members_and_toggle_stay_consistent() -> form_visibility::Result<()> {
    let mut page = Page::from_html(COLORS_FORM)?;
    page.assert_checked("#colors-all", false)?;

    page.set_checked("#red", true)?;
    page.set_checked("#green", true)?;
    page.assert_checked("#colors-all", false)?;
    page.set_checked("#blue", true)?;
    page.assert_checked("#colors-all", true)?;

    page.set_checked("#green", false)?;
    page.assert_checked("#colors-all", false)?;

    page.click("#colors-all")?;
    page.assert_checked("#red", true)?;
    page.assert_checked("#green", true)?;
    page.assert_checked("#blue", true)?;
    page.assert_checked("#colors-all", true)?;

    page.click("#colors-all")?;
    page.assert_checked("#red", false)?;
    page.assert_checked("#green", false)?;
    page.assert_checked("#blue", false)?;
    Ok(())
}

#[test]
fn two_select_all_toggles_stay_in_step() -> form_visibility::Result<()> {
    let html = r#"
    <form id="days">
      <label><input type="checkbox" name="days" id="all-top"> All days</label>
      <label><input type="checkbox" name="days" id="mon"> Monday</label>
      <label><input type="checkbox" name="days" id="tue"> Tuesday</label>
      <label><input type="checkbox" name="days" id="all-bottom"> Select All</label>
    </form>
    "#;
    let mut page = Page::from_html(html)?;

    page.click("#all-top")?;
    page.assert_checked("#mon", true)?;
    page.assert_checked("#tue", true)?;
    page.assert_checked("#all-bottom", true)?;

    page.click("#tue")?;
    page.assert_checked("#all-top", false)?;
    page.assert_checked("#all-bottom", false)?;

    page.click("#tue")?;
    page.assert_checked("#all-top", true)?;
    page.assert_checked("#all-bottom", true)?;

    page.click("#all-bottom")?;
    page.assert_checked("#mon", false)?;
    page.assert_checked("#all-top", false)?;
    Ok(())
}

#[test]
fn initialization_does_not_push_toggle_onto_members() -> form_visibility::Result<()> {
    let html = COLORS_FORM.replace(
        r#"id="colors-all" value="all""#,
        r#"id="colors-all" value="all" checked"#,
    );
    let page = Page::from_html(&html)?;
    page.assert_checked("#red", false)?;
    page.assert_checked("#colors-all", false)?;
    Ok(())
}

#[test]
fn restored_full_group_checks_the_toggle() -> form_visibility::Result<()> {
    let html = COLORS_FORM
        .replace(r#"value="red""#, r#"value="red" checked"#)
        .replace(r#"value="green""#, r#"value="green" checked"#)
        .replace(r#"value="blue""#, r#"value="blue" checked"#);
    let page = Page::from_html(&html)?;
    page.assert_checked("#colors-all", true)?;
    Ok(())
}

#[test]
fn group_names_with_periods_resolve() -> form_visibility::Result<()> {
    let html = r#"
    <label><input type="radio" name="owner.pets" id="owner.pets-yes"> Yes</label>
    <label><input type="radio" name="owner.pets" id="owner.pets-no"> No</label>
    <div id="owner.pets-yes-content">details</div>
    <div id="owner.pets-no-content"><input id="why" value="allergy"></div>
    <label><input type="checkbox" id="owner.pets_99" value="99"> Other</label>
    <div id="other-owner.pets"><input id="which" value=""></div>
    "#;
    let mut page = Page::with_config(html, ControllerConfig::new().strict(true))?;
    page.assert_hidden(r"#owner\.pets-yes-content")?;

    page.click(r"#owner\.pets-yes")?;
    page.assert_visible(r"#owner\.pets-yes-content")?;
    page.assert_hidden(r"#owner\.pets-no-content")?;
    page.assert_value("#why", "")?;

    page.click(r"#owner\.pets_99")?;
    page.assert_visible(r"#other-owner\.pets")?;
    Ok(())
}

#[test]
fn strict_mode_rejects_missing_counterpart() {
    let html = r#"
    <input type="checkbox" id="pets_99" value="99">
    "#;
    let err = match Page::with_config(html, ControllerConfig::new().strict(true)) {
        Ok(_) => panic!("strict bind should fail"),
        Err(err) => err,
    };
    assert_eq!(
        err,
        Error::MissingCounterpart {
            id: "other-pets".into(),
            referenced_by: "other checkbox #pets_99".into(),
        }
    );
}

#[test]
fn lenient_mode_records_findings_and_keeps_working() -> form_visibility::Result<()> {
    let html = r#"
    <input type="radio" name="solo" id="solo-yes">
    <div id="solo-yes-content"></div>
    "#;
    let mut page = Page::from_html(html)?;
    assert_eq!(
        page.findings(),
        ["missing element #solo-no referenced by radio group solo".to_string()]
    );
    page.click("#solo-yes")?;
    page.assert_visible("#solo-yes-content")?;
    Ok(())
}

#[test]
fn custom_toggle_pattern_selects_the_group_toggle() -> form_visibility::Result<()> {
    let html = r#"
    <label><input type="checkbox" name="days" id="days-every"> Every day</label>
    <label><input type="checkbox" name="days" id="mon"> Monday</label>
    <label><input type="checkbox" name="days" id="tue"> Tuesday</label>
    "#;
    let config = ControllerConfig::new().toggle_label_pattern(r"^Every\b")?;
    let mut page = Page::with_config(html, config)?;
    page.click("#days-every")?;
    page.assert_checked("#mon", true)?;
    page.assert_checked("#tue", true)?;
    Ok(())
}

#[test]
fn label_for_association_counts_as_a_label() -> form_visibility::Result<()> {
    let html = r#"
    <input type="checkbox" name="fruit" id="fruit-all"><label for="fruit-all">All fruit</label>
    <input type="checkbox" name="fruit" id="apple"><label for="apple">Apple</label>
    "#;
    let mut page = Page::from_html(html)?;
    page.click("label[for=apple]")?;
    page.assert_checked("#apple", true)?;
    page.assert_checked("#fruit-all", true)?;
    Ok(())
}

#[test]
fn assertion_failure_carries_a_snippet() -> form_visibility::Result<()> {
    let page = Page::from_html(COLORS_FORM)?;
    let err = page
        .assert_visible("#other-colors")
        .expect_err("pane starts hidden");
    match err {
        Error::AssertionFailed {
            expected,
            actual,
            dom_snippet,
            ..
        } => {
            assert_eq!(expected, "visible");
            assert_eq!(actual, "hidden");
            assert!(dom_snippet.starts_with("<div"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}
