#[cfg(test)]
mod tests {
    use crate::types::{GenomeSpan, Interval};

    // =========================================================================
    // Overlap semantics
    // =========================================================================

    #[test]
    fn overlapping_ranges_on_same_contig_overlap() {
        let a = GenomeSpan::new("chr1", 100, 200);
        let b = GenomeSpan::new("chr1", 150, 250);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_ranges_overlap() {
        // Coordinates are closed intervals, so sharing an endpoint counts.
        let a = GenomeSpan::new("chr1", 100, 200);
        let b = GenomeSpan::new("chr1", 200, 300);
        assert!(a.overlaps(&b));
    }

    #[test]
    fn disjoint_ranges_on_same_contig_do_not_overlap() {
        let a = GenomeSpan::new("chr1", 100, 200);
        let b = GenomeSpan::new("chr1", 201, 300);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn different_contigs_never_overlap() {
        let a = GenomeSpan::new("chr1", 100, 200);
        let b = GenomeSpan::new("chr2", 100, 200);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn equal_spans_overlap_and_share_a_key() {
        let a = GenomeSpan::new("chr1", 100, 200);
        let b = GenomeSpan::new("chr1", 100, 200);
        assert!(a.overlaps(&b));
        assert_eq!(a.key(), b.key());
    }

    // =========================================================================
    // Parse / display
    // =========================================================================

    #[test]
    fn parse_roundtrips_display() {
        let span: GenomeSpan = "chr1:100-200".parse().unwrap();
        assert_eq!(span, GenomeSpan::new("chr1", 100, 200));
        assert_eq!(span.to_string(), "chr1:100-200");
    }

    #[test]
    fn parse_keeps_colons_inside_contig_names() {
        let span: GenomeSpan = "HLA-DRB1*15:01:1-500".parse().unwrap();
        assert_eq!(span.contig, "HLA-DRB1*15:01");
        assert_eq!((span.start, span.stop), (1, 500));
    }

    #[test]
    fn parse_rejects_malformed_spans() {
        assert!("chr1".parse::<GenomeSpan>().is_err());
        assert!("chr1:100".parse::<GenomeSpan>().is_err());
        assert!(":100-200".parse::<GenomeSpan>().is_err());
        assert!("chr1:0-50".parse::<GenomeSpan>().is_err());
        assert!("chr1:200-100".parse::<GenomeSpan>().is_err());
        assert!("chr1:abc-200".parse::<GenomeSpan>().is_err());
    }
}
