use clipgen::add_comma::add_comma;
use clipgen::annotate::annotate;
use clipgen::checkdigit::compute;
use clipgen::counterstring::generate;
use clipgen::{CheckDigitError, FormatError};

#[test]
fn asn_check_letter_pinned() {
    // the 18 character seed is one digit short
    assert_eq!(
        compute("1234AA123456789012"),
        Err(CheckDigitError::InvalidLength(18))
    );
    assert_eq!(
        compute("1234AA1234567890123").unwrap(),
        "1234AA1234567890123D"
    );
}

#[test]
fn counter_string_lengths() {
    for target in 0..300 {
        assert_eq!(generate(target, "*").unwrap().len(), target);
    }
}

#[test]
fn comma_formatter() {
    assert_eq!(
        add_comma("One\nTwo\nThree").unwrap(),
        "'One',\n'Two',\n'Three'\n"
    );
    assert_eq!(add_comma(""), Err(FormatError::Empty));
}

#[test]
fn annotator() {
    assert_eq!(annotate("now help"), "now() help()");
}
