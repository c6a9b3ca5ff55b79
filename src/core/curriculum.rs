//! Static course catalog.
//!
//! The engine only needs identifiers and grading hints from the course
//! content: which lessons make up each module, what each lesson's mini-task
//! asks for, each quiz's answer key, and what each project's objectives are.
//! Lesson prose and starter code belong to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StrideError};

/// XP awarded for finishing a lesson.
pub const XP_PER_LESSON: u64 = 50;

/// XP awarded for a verified project.
pub const XP_PER_PROJECT: u64 = 200;

/// Course difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// The hands-on exercise attached to a lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiniTask {
    /// What the learner is asked to do.
    pub description: String,
    /// Text that must appear in the program output for the local check to pass.
    pub expected_output: Option<String>,
}

/// A multiple-choice question closing a lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_answer: usize,
}

/// A lesson inside a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub task: MiniTask,
    pub quiz: Vec<QuizQuestion>,
}

impl Lesson {
    /// Whether `answers` (option indices, one per question) are all correct.
    pub fn quiz_passed(&self, answers: &[usize]) -> bool {
        answers.len() == self.quiz.len()
            && self
                .quiz
                .iter()
                .zip(answers)
                .all(|(question, &answer)| question.correct_answer == answer)
    }

    /// Decide whether the lesson may be marked finished.
    ///
    /// Every quiz answer must be right, and a mini-task that was checked must
    /// not have failed. An unchecked task (`None`) does not block.
    pub fn completion_gate(&self, answers: &[usize], task_passed: Option<bool>) -> Result<()> {
        if answers.len() != self.quiz.len() {
            return Err(StrideError::invalid_input(format!(
                "lesson '{}' has {} quiz question(s), got {} answer(s)",
                self.id,
                self.quiz.len(),
                answers.len()
            )));
        }
        if !self.quiz_passed(answers) {
            return Err(StrideError::invalid_input(format!(
                "quiz answers for lesson '{}' are not all correct",
                self.id
            )));
        }
        if task_passed == Some(false) {
            return Err(StrideError::invalid_input(format!(
                "mini-task for lesson '{}' has not passed",
                self.id
            )));
        }
        Ok(())
    }
}

/// A named group of lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub lessons: Vec<Lesson>,
}

/// A guided project, graded as a whole by the solution checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub objectives: Vec<String>,
}

impl Project {
    /// Task description handed to the solution checker.
    pub fn verification_task(&self) -> String {
        format!(
            "Project Verification for '{}'. Objectives: {}",
            self.title,
            self.objectives.join(", ")
        )
    }
}

/// The full course catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curriculum {
    pub modules: Vec<Module>,
    pub projects: Vec<Project>,
}

impl Curriculum {
    /// Look up a lesson by id.
    pub fn lesson(&self, id: &str) -> Option<&Lesson> {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter())
            .find(|l| l.id == id)
    }

    /// Look up a project by id.
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Whether `id` names a lesson in this catalog.
    pub fn has_lesson(&self, id: &str) -> bool {
        self.lesson(id).is_some()
    }

    /// Whether `id` names a project in this catalog.
    pub fn has_project(&self, id: &str) -> bool {
        self.project(id).is_some()
    }

    /// Ids of every module, in course order.
    pub fn module_ids(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.id.as_str())
    }

    /// Lesson ids of the opening module (empty if the catalog has no modules).
    pub fn first_module_lessons(&self) -> Vec<&str> {
        self.modules
            .first()
            .map(|m| m.lessons.iter().map(|l| l.id.as_str()).collect())
            .unwrap_or_default()
    }

    /// Total number of lessons across all modules.
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }
}

fn lesson(
    id: &str,
    title: &str,
    task: &str,
    expected: Option<&str>,
    quiz: Vec<QuizQuestion>,
) -> Lesson {
    Lesson {
        id: id.to_string(),
        title: title.to_string(),
        task: MiniTask {
            description: task.to_string(),
            expected_output: expected.map(str::to_string),
        },
        quiz,
    }
}

fn question(id: &str, text: &str, options: &[&str], correct_answer: usize) -> QuizQuestion {
    QuizQuestion {
        id: id.to_string(),
        text: text.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer,
    }
}

fn project(id: &str, title: &str, difficulty: Difficulty, objectives: &[&str]) -> Project {
    Project {
        id: id.to_string(),
        title: title.to_string(),
        difficulty,
        objectives: objectives.iter().map(|o| o.to_string()).collect(),
    }
}

impl Default for Curriculum {
    fn default() -> Self {
        Self {
            modules: vec![
                Module {
                    id: "m1-intro".to_string(),
                    title: "Introduction to Python".to_string(),
                    difficulty: Difficulty::Beginner,
                    lessons: vec![
                        lesson(
                            "l1-hello",
                            "Hello, Musoma!",
                            "Write a program that prints 'Jambo Erick' to the console.",
                            Some("Jambo Erick"),
                            vec![question(
                                "q1",
                                "Which function is used to output text in Python?",
                                &["console.log()", "print()", "echo()", "write()"],
                                1,
                            )],
                        ),
                        lesson(
                            "l2-vars",
                            "Variables from Mara",
                            "Store the name of a town in a variable called `town` and print it.",
                            Some("Musoma"),
                            vec![question(
                                "q2",
                                "How do you create a variable in Python?",
                                &["var x = 5", "int x = 5", "x = 5", "declare x = 5"],
                                2,
                            )],
                        ),
                    ],
                },
                Module {
                    id: "m2-control".to_string(),
                    title: "Control Flow".to_string(),
                    difficulty: Difficulty::Beginner,
                    lessons: vec![lesson(
                        "l3-if",
                        "Decisions on the Road",
                        "Given speed = 90, print 'Slow down' when speed is above 80.",
                        Some("Slow down"),
                        vec![question(
                            "q3",
                            "What indicates a block of code in Python?",
                            &["Curly brackets {}", "Indentation", "Parentheses ()", "Semicolons ;"],
                            1,
                        )],
                    )],
                },
                Module {
                    id: "m3-structures".to_string(),
                    title: "Data Structures".to_string(),
                    difficulty: Difficulty::Intermediate,
                    lessons: vec![lesson(
                        "l4-lists",
                        "Lists of Cities",
                        "Append 'Mbeya' to the list ['Dar', 'Dodoma'] and print the list.",
                        Some("['Dar', 'Dodoma', 'Mbeya']"),
                        vec![question(
                            "q4",
                            "Which method adds an item to the end of a list?",
                            &["add()", "insert()", "append()", "push()"],
                            2,
                        )],
                    )],
                },
                Module {
                    id: "m4-advanced".to_string(),
                    title: "Advanced Python".to_string(),
                    difficulty: Difficulty::Advanced,
                    lessons: vec![lesson(
                        "l5-classes",
                        "Classes and Objects",
                        "Create an Animal class with a name attribute and print the name of an Animal called 'Simba'.",
                        Some("Simba"),
                        vec![question(
                            "q5",
                            "What is the correct name of the constructor method in Python?",
                            &["init()", "__init__", "constructor()", "def()"],
                            1,
                        )],
                    )],
                },
            ],
            projects: vec![
                project(
                    "p1-calc",
                    "Serengeti Market Calculator",
                    Difficulty::Beginner,
                    &[
                        "Create variables for item prices.",
                        "Use hardcoded values for payment.",
                        "Apply a 10% discount if total is over 10,000.",
                        "Print a formatted receipt.",
                    ],
                ),
                project(
                    "p2-game",
                    "Guess the Number",
                    Difficulty::Beginner,
                    &[
                        "Import the random module.",
                        "Use a while loop to keep asking for guesses.",
                        "Use if/else to give 'Too High' or 'Too Low' hints.",
                        "Break the loop when guessed correctly.",
                    ],
                ),
                project(
                    "p3-budget",
                    "Safari Expense Tracker",
                    Difficulty::Intermediate,
                    &[
                        "Create a list of dictionaries, one per expense.",
                        "Write a function to add an expense.",
                        "Write a function to calculate total cost.",
                        "Write a function to find the most expensive item.",
                    ],
                ),
                project(
                    "p4-api",
                    "Tourism Data Analyzer",
                    Difficulty::Advanced,
                    &[
                        "Define a class that wraps a list of tourist records.",
                        "Add a method that filters visitors by country.",
                        "Print the number of visitors from one country.",
                    ],
                ),
            ],
        }
    }
}
