use crate::model::section::{BoardDoc, Section, SectionId};
use crate::model::task::{Label, Priority, TaskItem};

fn label(id: &str, title: &str) -> Label {
    Label {
        id: id.to_string(),
        title: title.to_string(),
    }
}

/// Sample board written by `td init --seed`. Ids are fixed so that the
/// sample is the same on every machine.
pub fn seed_board() -> BoardDoc {
    let read = label("0", "read");
    let write = label("1", "write");

    let mut chapter = TaskItem::with_id("t-chapter", "Draft chapter two");
    chapter.priority = Some(Priority::High);
    chapter.labels = vec![write.clone()];
    let chapter = chapter
        .child(TaskItem::with_id("t-outline", "Outline scenes"))
        .child(
            TaskItem::with_id("t-research", "Research setting")
                .child(TaskItem::with_id("t-maps", "Collect old maps")),
        );

    let mut reading = TaskItem::with_id("t-reading", "Reading list");
    reading.labels = vec![read.clone()];
    reading.description = Some("Books to finish before the next draft".into());
    let reading = reading
        .child(TaskItem::with_id("t-book-1", "The Left Hand of Darkness"))
        .child(TaskItem::with_id("t-book-2", "Piranesi"));

    let mut notes = TaskItem::with_id("t-notes", "Tidy notes folder");
    notes.priority = Some(Priority::Low);

    let todo = Section {
        id: SectionId::from("todo"),
        title: "To do".into(),
        collapsed: false,
        tasks: vec![chapter, reading],
    };
    let later = Section {
        id: SectionId::from("later"),
        title: "Later".into(),
        collapsed: false,
        tasks: vec![notes],
    };

    BoardDoc {
        sections: vec![todo, later],
        labels: vec![read, write],
    }
}

/// Board written by a plain `td init`: one empty section
pub fn empty_board() -> BoardDoc {
    BoardDoc {
        sections: vec![Section::new("To do")],
        labels: Vec::new(),
    }
}
