/// Expands a user's target role into a small fixed set of related titles.
///
/// Total function: the input title always comes first, and unknown titles
/// get the generic software fallback. The table is static data with no
/// side effects; keep it that way.
pub fn related_titles(job_title: &str) -> Vec<String> {
    let extra: &[&str] = match job_title {
        "Backend Developer" => &[
            "Full Stack Developer",
            "Node.js Developer",
            "Java Developer",
            "Python Developer",
            "Software Engineer",
        ],
        "Frontend Developer" => &[
            "Web Developer",
            "Full Stack Developer",
            "UI Developer",
            "React Developer",
            "Angular Developer",
        ],
        "Flutter Developer" => &[
            "Mobile Developer",
            "iOS Developer",
            "Android Developer",
            "React Native Developer",
        ],
        "Data Scientist" => &[
            "Machine Learning Engineer",
            "AI Engineer",
            "Data Analyst",
            "Data Engineer",
        ],
        "Machine Learning Engineer" => &[
            "AI Engineer",
            "Data Scientist",
            "Deep Learning Engineer",
            "NLP Engineer",
        ],
        "AI Engineer" => &[
            "Machine Learning Engineer",
            "Data Scientist",
            "AI Researcher",
            "Computer Vision Engineer",
        ],
        "DevOps Engineer" => &[
            "Site Reliability Engineer",
            "Platform Engineer",
            "Cloud Engineer",
            "Infrastructure Engineer",
        ],
        "Full Stack Developer" => &[
            "Software Engineer",
            "Backend Developer",
            "Frontend Developer",
            "Web Developer",
        ],
        _ => &["Software Engineer", "Developer", "Programmer"],
    };

    let mut related = Vec::with_capacity(1 + extra.len());
    related.push(job_title.to_string());
    related.extend(extra.iter().map(|s| s.to_string()));
    related
}
