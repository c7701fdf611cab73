// All LLM prompt constants for resume content generation.

/// System message for resume generation.
pub const RESUME_SYSTEM: &str = "You are an expert resume writer.";

/// Resume generation prompt template.
/// Replace: {json_only_instruction}, {full_name}, {email}, {phone}, {career_objective},
///          {education}, {skills}, {projects}, {experience}, {certifications},
///          {linkedin}, {github}, {job_description}
pub const RESUME_PROMPT_TEMPLATE: &str = r#"You are an expert AI-powered resume writer. Your task is to take the user's raw input and generate a highly polished, professional, ATS-friendly resume. Use action verbs, measurable impact (if available), and clear formatting.

Respond ONLY in this structured JSON format:
{
  "full_name": "",
  "email": "",
  "phone": "",
  "linkedin": "",
  "github": "",
  "career_objective": "",
  "education": "",
  "skills": ["Skill 1", "Skill 2", "Skill 3", "Skill 4", "Skill 5"],
  "projects": [
    {"title": "", "technologies": "", "description": ""},
    {"title": "", "technologies": "", "description": ""}
  ],
  "experience": ["Point 1", "Point 2", "Point 3", "Point 4"],
  "certifications": [
    {"title": "", "provider": "", "date": ""}
  ]
}

Instructions for Enhancement:

- Career Objective: Write a strong 2–3 line objective focused on motivation, learning attitude, and role aspiration.
- Education: Include degree, stream, university name, and graduation year.
- Skills: Return at least 5 technical skills as a list of strings.
- Projects: Return 2 academic/personal projects as a list of objects. Each project must have:
  - A meaningful title
  - A short list of technologies used
  - A 2–3 sentence description of what was built and what it achieved
- Experience: For freshers, include any lab work, internships, coding practice, teamwork, etc. as 3–4 bullet points (list of strings).
- Certifications: Include relevant certificates, workshops, or online courses as a list of structured entries with provider and year.
- Preserve the email, phone, GitHub, and LinkedIn as provided in input.
- If a job description is provided, align wording and emphasis with it without inventing experience.
- {json_only_instruction}

User Input:
Full Name: {full_name}
Email: {email}
Phone: {phone}
Career Objective: {career_objective}
Education: {education}
Skills: {skills}
Projects: {projects}
Experience: {experience}
Certifications: {certifications}
LinkedIn: {linkedin}
GitHub: {github}
Job Description (optional): {job_description}

Please ensure the final JSON is well-formatted, complete, and resume-ready."#;
