//! 评价统计：正负面占比与结论档位
//!
//! 纯函数，无 I/O。档位边界：60% 恰好落在 "KHÁ TÍCH CỰC"（>= 60 先于
//! 40..=60 被命中，"LẪN LỘN" 实际覆盖 [40, 60)）；10% 及以下为 "CỰC KỲ TIÊU CỰC"。

use crate::reader::review::models::Review;

/// 评价统计结果
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewAnalysis {
    pub positive_count: usize,
    pub negative_count: usize,
    pub total_count: usize,
    /// 四舍五入到整数的百分比
    pub positive_percentage: i32,
    pub negative_percentage: i32,
    pub verdict: &'static str,
    pub text_color: &'static str,
}

/// 对一组评价做正负面统计并给出结论档位
pub fn analyze_reviews(reviews: &[Review]) -> ReviewAnalysis {
    let positive_count = reviews
        .iter()
        .filter(|r| r.review_type.eq_ignore_ascii_case("positive"))
        .count();
    let negative_count = reviews
        .iter()
        .filter(|r| r.review_type.eq_ignore_ascii_case("negative"))
        .count();
    let total_count = positive_count + negative_count;

    let positive_percentage = if total_count > 0 {
        positive_count as f64 / total_count as f64 * 100.0
    } else {
        0.0
    };
    let negative_percentage = if total_count > 0 {
        negative_count as f64 / total_count as f64 * 100.0
    } else {
        0.0
    };

    let (verdict, text_color) = if total_count == 0 {
        ("CHƯA CÓ ĐÁNH GIÁ", "lightGray")
    } else if positive_percentage >= 90.0 {
        ("CỰC KỲ TÍCH CỰC", "green")
    } else if positive_percentage >= 75.0 {
        ("RẤT TÍCH CỰC", "green")
    } else if positive_percentage >= 60.0 {
        ("KHÁ TÍCH CỰC", "green")
    } else if positive_percentage >= 40.0 {
        ("LẪN LỘN", "yellow")
    } else if positive_percentage >= 25.0 {
        ("KHÁ TIÊU CỰC", "red")
    } else if positive_percentage > 10.0 {
        ("RẤT TIÊU CỰC", "red")
    } else {
        ("CỰC KỲ TIÊU CỰC", "red")
    };

    ReviewAnalysis {
        positive_count,
        negative_count,
        total_count,
        positive_percentage: positive_percentage.round() as i32,
        negative_percentage: negative_percentage.round() as i32,
        verdict,
        text_color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reviews(positive: usize, negative: usize) -> Vec<Review> {
        let mut out = Vec::new();
        for _ in 0..positive {
            out.push(Review {
                review_type: "positive".to_string(),
                ..Default::default()
            });
        }
        for _ in 0..negative {
            out.push(Review {
                review_type: "negative".to_string(),
                ..Default::default()
            });
        }
        out
    }

    #[test]
    fn empty_input_has_no_verdict() {
        let analysis = analyze_reviews(&[]);
        assert_eq!(analysis.verdict, "CHƯA CÓ ĐÁNH GIÁ");
        assert_eq!(analysis.positive_percentage, 0);
        assert_eq!(analysis.total_count, 0);
    }

    #[test]
    fn all_positive_is_extremely_positive() {
        let analysis = analyze_reviews(&reviews(10, 0));
        assert_eq!(analysis.verdict, "CỰC KỲ TÍCH CỰC");
        assert_eq!(analysis.positive_percentage, 100);
        assert_eq!(analysis.text_color, "green");
    }

    #[test]
    fn even_split_is_mixed() {
        let analysis = analyze_reviews(&reviews(5, 5));
        assert_eq!(analysis.verdict, "LẪN LỘN");
        assert_eq!(analysis.positive_percentage, 50);
        assert_eq!(analysis.negative_percentage, 50);
    }

    #[test]
    fn one_in_ten_positive_is_extremely_negative() {
        let analysis = analyze_reviews(&reviews(1, 9));
        assert_eq!(analysis.verdict, "CỰC KỲ TIÊU CỰC");
        assert_eq!(analysis.positive_percentage, 10);
    }

    #[test]
    fn exactly_sixty_percent_hits_the_positive_branch_first() {
        let analysis = analyze_reviews(&reviews(6, 4));
        assert_eq!(analysis.verdict, "KHÁ TÍCH CỰC");
    }

    #[test]
    fn counts_partition_the_total() {
        let analysis = analyze_reviews(&reviews(3, 8));
        assert_eq!(
            analysis.positive_count + analysis.negative_count,
            analysis.total_count
        );
    }

    #[test]
    fn unknown_types_are_ignored() {
        let mut input = reviews(2, 0);
        input.push(Review {
            review_type: "meh".to_string(),
            ..Default::default()
        });
        let analysis = analyze_reviews(&input);
        assert_eq!(analysis.total_count, 2);
        assert_eq!(analysis.verdict, "CỰC KỲ TÍCH CỰC");
    }
}
