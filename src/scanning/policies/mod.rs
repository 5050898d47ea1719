mod severity_ranking;

pub use severity_ranking::SeverityRanking;
