//! Normalizing already-normalized text must change nothing.

use textmill_normalize::normalize;

const SAMPLES: &[&str] = &[
    "Breaking news\n\n* Home\n* About\nThe council voted 5 to 2 on 3/4/2021.\nContact press@city.gov\n\nFollow us on Twitter\n© 2021 City\n",
    "Contact me at test@example.com or +1 (555) 123-4567",
    "a\n\n\n\nb",
    "  Title  \n\n\nParagraph one   with   gaps.[2]\n\n\nParagraph two, see www.example.org/x for more.\nAll rights reserved\n",
    "Prices rose 12.5% in 2023.\nIndex: 1.2.2023 baseline\n_____\nEnd",
    "Intro\nsales@shop.com * Free returns\nEnd",
    "Menu\nhttps://shop.example/x * Cart\nEnd",
    "Notes\n+44 20 7946 0958 • Call us\n[4] * footnote bullet\nDone",
    "",
];

#[test]
fn test_normalize_is_a_fixed_point() {
    for sample in SAMPLES {
        let once = normalize(sample);
        let twice = normalize(&once);
        assert_eq!(once, twice, "not a fixed point for {:?}", sample);
    }
}

#[test]
fn test_output_is_trimmed_and_has_no_blank_runs() {
    for sample in SAMPLES {
        let cleaned = normalize(sample);
        assert_eq!(cleaned, cleaned.trim());
        assert!(!cleaned.contains("\n\n"), "blank run left in {:?}", cleaned);
        assert!(!cleaned.contains("  "), "double space left in {:?}", cleaned);
    }
}
