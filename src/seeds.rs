//! Built-in lesson that guarantees the app is useful without external config.
//! One challenge per interaction type.

use crate::domain::{AnswerOption, Challenge, ChallengeType, LessonItem, OptionId};

pub const SEED_LESSON: &str = "cloud-basics";

fn opt(id: OptionId, text: &str, correct: bool) -> AnswerOption {
  AnswerOption { id, text: text.into(), correct, image_src: None, audio_src: None, order: None }
}

fn ordered(id: OptionId, text: &str, order: u32) -> AnswerOption {
  AnswerOption { order: Some(order), ..opt(id, text, false) }
}

fn challenge(id: i64, kind: ChallengeType, question: &str) -> Challenge {
  Challenge {
    id,
    question: question.into(),
    kind,
    hint: None,
    audio_src: None,
    video_src: None,
    correct_answer: None,
  }
}

fn item(challenge: Challenge, options: Vec<AnswerOption>) -> LessonItem {
  LessonItem { lesson: SEED_LESSON.into(), challenge, options }
}

pub fn seed_lesson() -> Vec<LessonItem> {
  vec![
    item(
      Challenge {
        hint: Some("Think \"compute\".".into()),
        ..challenge(1, ChallengeType::Select, "Which service provides resizable virtual servers?")
      },
      vec![opt(1, "EC2", true), opt(2, "S3", false), opt(3, "DynamoDB", false), opt(4, "CloudFront", false)],
    ),
    item(
      challenge(2, ChallengeType::Assist, "Object storage ____ is called S3."),
      vec![opt(1, "service", true), opt(2, "queue", false), opt(3, "cluster", false)],
    ),
    item(
      challenge(3, ChallengeType::TrueFalse, "S3 bucket names must be globally unique."),
      vec![opt(1, "True", true), opt(2, "False", false)],
    ),
    item(
      challenge(4, ChallengeType::DragDrop, "Order the steps to launch an instance."),
      vec![
        ordered(1, "Choose an AMI", 1),
        ordered(2, "Pick an instance type", 2),
        ordered(3, "Configure security group", 3),
        ordered(4, "Launch", 4),
      ],
    ),
    item(
      Challenge {
        correct_answer: Some("EC2".into()),
        hint: Some("Three characters.".into()),
        ..challenge(5, ChallengeType::TextInput, "Type the short name of Elastic Compute Cloud.")
      },
      vec![],
    ),
    item(
      Challenge {
        correct_answer: Some("Lambda".into()),
        ..challenge(6, ChallengeType::SpeechInput, "Say the name of the serverless compute service.")
      },
      vec![],
    ),
    item(
      challenge(7, ChallengeType::ImageSelect, "Which icon represents a storage bucket?"),
      vec![
        AnswerOption { image_src: Some("/img/bucket.svg".into()), ..opt(1, "Bucket", true) },
        AnswerOption { image_src: Some("/img/server.svg".into()), ..opt(2, "Server", false) },
        AnswerOption { image_src: Some("/img/database.svg".into()), ..opt(3, "Database", false) },
      ],
    ),
    item(
      Challenge {
        audio_src: Some("/audio/iam.mp3".into()),
        ..challenge(8, ChallengeType::Listening, "Which service did you hear?")
      },
      vec![opt(1, "IAM", true), opt(2, "VPC", false), opt(3, "SNS", false)],
    ),
    item(
      Challenge {
        video_src: Some("/video/regions.mp4".into()),
        ..challenge(9, ChallengeType::Video, "How many availability zones did the region in the video have?")
      },
      vec![opt(1, "Two", false), opt(2, "Three", true), opt(3, "Six", false)],
    ),
  ]
}
