use fmtlog::template::{required_arguments, validate_template};
use fmtlog::{measure, render, render_into, sprintf, thread_heap_fallbacks, FmtArg, FormatError, SCRATCH_CAPACITY};

#[test]
fn test_scenarios() {
    assert_eq!(sprintf!("%s has %d items", "cart", 3).unwrap(), "cart has 3 items");
    assert_eq!(sprintf!("%d%%", 50).unwrap(), "50%");
}

#[test]
fn test_matches_c_printf() {
    let integers: &[(&str, i64, &str)] = &[
        ("%d", -42, "-42"),
        ("%8d", 1234, "    1234"),
        ("%-8d|", 1234, "1234    |"),
        ("%08d", -77, "-0000077"),
        ("%+d", 5, "+5"),
        ("%x", 48879, "beef"),
        ("%#X", 48879, "0XBEEF"),
        ("%o", 8, "10"),
        ("%#o", 0, "0"),
        ("%5.0d", 0, "     "),
    ];
    for (template, value, expected) in integers {
        let text = render(template, &[FmtArg::Int(*value, 32)]).unwrap();
        assert_eq!(&text, expected, "template {template:?}");
    }

    let floats: &[(&str, f64, &str)] = &[
        ("%f", 3.5, "3.500000"),
        ("%.2f", 0.125, "0.12"),
        ("%.0f", 2.5, "2"),
        ("%10.3f", -1.0, "    -1.000"),
        ("%#.0e", 5.0, "5.e+00"),
        ("%.3g", 1234.5, "1.23e+03"),
    ];
    for (template, value, expected) in floats {
        let text = render(template, &[FmtArg::Float(*value)]).unwrap();
        assert_eq!(&text, expected, "template {template:?}");
    }
}

#[test]
fn test_exponent_and_general() {
    assert_eq!(sprintf!("%e", 12345.678).unwrap(), "1.234568e+04");
    assert_eq!(sprintf!("%.2E", 0.000123).unwrap(), "1.23E-04");
    assert_eq!(sprintf!("%g", 100000.0).unwrap(), "100000");
    assert_eq!(sprintf!("%g", 1000000.0).unwrap(), "1e+06");
    assert_eq!(sprintf!("%g", 0.5).unwrap(), "0.5");
}

#[test]
fn test_star_width_and_precision() {
    assert_eq!(sprintf!("[%*d]", 5, 42).unwrap(), "[   42]");
    assert_eq!(sprintf!("[%*d]", -5, 42).unwrap(), "[42   ]");
    assert_eq!(sprintf!("[%.*s]", 3, "abcdef").unwrap(), "[abc]");
}

#[test]
fn test_long_output_falls_back_to_heap() {
    let long = "x".repeat(2000);
    let before = thread_heap_fallbacks();
    let text = sprintf!("%s", long).unwrap();
    assert_eq!(text.len(), 2000);
    assert_eq!(text, long);
    assert_eq!(thread_heap_fallbacks(), before + 1);
}

#[test]
fn test_scratch_capacity_boundary() {
    let just_fits = "a".repeat(SCRATCH_CAPACITY - 1);
    let too_long = "a".repeat(SCRATCH_CAPACITY);

    let before = thread_heap_fallbacks();
    assert_eq!(render("%s", &[FmtArg::Str(&just_fits)]).unwrap(), just_fits);
    assert_eq!(thread_heap_fallbacks(), before);

    assert_eq!(render("%s", &[FmtArg::Str(&too_long)]).unwrap(), too_long);
    assert_eq!(thread_heap_fallbacks(), before + 1);
}

#[test]
fn test_measure_equals_rendered_length() {
    let templates: &[(&str, &[FmtArg<'_>])] = &[
        ("%s has %d items", &[FmtArg::Str("cart"), FmtArg::Int(3, 32)]),
        ("%-12s|%+.3e", &[FmtArg::Str("naïve"), FmtArg::Float(-0.001)]),
        ("%#o %#x %c", &[FmtArg::Uint(8, 32), FmtArg::Uint(255, 32), FmtArg::Char('é')]),
        ("%p", &[FmtArg::Ptr(0x1000)]),
        ("%5%", &[]),
    ];
    for (template, args) in templates {
        let text = render(template, args).unwrap();
        assert_eq!(measure(template, args).unwrap(), text.len(), "template {template:?}");
    }
}

#[test]
fn test_render_into_reports_full_size() {
    let mut buf = [0u8; 4];
    let needed = render_into(&mut buf, "%d-%d", &[FmtArg::Int(123, 32), FmtArg::Int(456, 32)]).unwrap();
    assert_eq!(needed, 7);
    assert_eq!(&buf, b"123-");
}

#[test]
fn test_missing_argument_fails() {
    let err = render("%s and %s", &[FmtArg::Str("one")]).unwrap_err();
    assert_eq!(
        err,
        FormatError::MissingArgument {
            offset: 7,
            index: 1,
            supplied: 1
        }
    );

    let template = String::from("%d items");
    assert!(sprintf!(template.as_str()).is_err());
}

#[test]
fn test_malformed_templates_fail() {
    assert!(matches!(
        render("%y", &[FmtArg::Int(1, 32)]),
        Err(FormatError::UnsupportedConversion { offset: 0, conversion: 'y' })
    ));
    assert!(matches!(
        render("trailing %-", &[]),
        Err(FormatError::TruncatedSpecifier { offset: 9 })
    ));
    assert!(matches!(
        render("%d", &[FmtArg::Str("seven")]),
        Err(FormatError::ArgumentMismatch { index: 0, conversion: 'd', .. })
    ));
}

#[test]
fn test_const_validation_agrees_with_renderer() {
    for template in ["%s has %d items", "%d%%", "%*.*f", "plain"] {
        assert!(validate_template(template));
    }
    for template in ["%", "%y", "%99999999999d"] {
        assert!(!validate_template(template));
        assert!(render(template, &[FmtArg::Int(1, 32)]).is_err());
    }
    assert_eq!(required_arguments("%*.*f %s"), Some(4));
    assert_eq!(required_arguments("100%%"), Some(0));
    assert_eq!(required_arguments("%"), None);
}
