//! Build a student profile from environment variables, a JSON document and
//! values set in code.
//!
//! Run with, for example:
//!
//! ```text
//! EXAMPLE_name=John EXAMPLE_address__City="San Diego" cargo run --example student
//! ```

use std::collections::HashMap;
use std::io::{self, Write};

use flatmerge::{env_map, merge};
use serde::{Deserialize, Serialize};

const CONFIG_FROM_FILE: &str =
    r#"{"name": "Mary", "address": {"city": "San Diego", "country": "US"}}"#;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Address {
    city: String,
    country: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Grade {
    teacher: String,
    number: f64,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Student {
    name: String,
    text_books: Vec<String>,
    address: Address,
    grades: HashMap<String, Grade>,
    gpa: f64,
}

impl Student {
    /// Recalculate the GPA from the current grades.
    #[expect(clippy::float_arithmetic, reason = "the GPA is an average of grades")]
    fn refresh_gpa(&mut self) {
        let count = u32::try_from(self.grades.len()).unwrap_or(u32::MAX);
        if count == 0 {
            self.gpa = 0.0;
            return;
        }
        let total: f64 = self.grades.values().map(|grade| grade.number).sum();
        self.gpa = total / f64::from(count);
    }
}

fn grades_from_code() -> Student {
    Student {
        grades: HashMap::from([
            (
                "Science".to_owned(),
                Grade {
                    teacher: "Dr. Smith".into(),
                    number: 89.99,
                },
            ),
            (
                "Computer Science".to_owned(),
                Grade {
                    teacher: "Dr. Steve".into(),
                    number: 99.99,
                },
            ),
        ]),
        ..Student::default()
    }
}

fn load_student() -> Result<Student, String> {
    let from_file: Student =
        serde_json::from_str(CONFIG_FROM_FILE).map_err(|err| err.to_string())?;
    let mut student = Student::default();
    merge(
        &mut student,
        env_map("EXAMPLE_"),
        [from_file, grades_from_code()],
    )
    .map_err(|err| err.to_string())?;
    student.refresh_gpa();
    Ok(student)
}

fn main() -> Result<(), String> {
    let student = load_student()?;
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "Name: {}, Books: {:?}, Address: {:?}, GPA: {:.2}",
        student.name, student.text_books, student.address, student.gpa
    )
    .map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_overrides_file_and_code() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("EXAMPLE_name", "John");
            jail.set_env("EXAMPLE_books", "B1,B2, B3, 'The Book', B4");
            jail.set_env("EXAMPLE_address__City", "San Diego");
            jail.set_env("EXAMPLE_address__Country", "US");

            let student = load_student()?;
            assert_eq!(student.name, "John");
            assert!(student.text_books.is_empty(), "books does not name a field");
            assert_eq!(
                student.address,
                Address {
                    city: "San Diego".into(),
                    country: "US".into(),
                }
            );
            assert_eq!(
                student.grades.get("Computer Science").map(|g| g.teacher.as_str()),
                Some("Dr. Steve")
            );
            assert_eq!(format!("{:.2}", student.gpa), "94.99");
            Ok(())
        });
    }

    #[test]
    fn file_values_apply_without_environment() {
        figment::Jail::expect_with(|_| {
            let student = load_student()?;
            assert_eq!(student.name, "Mary");
            assert_eq!(student.grades.len(), 2);
            Ok(())
        });
    }
}
