// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use maud::Markup;
use maud::html;

/// The bullet marker used in answers.
pub const BULLET: &str = "•";

/// The UTF-8 bytes of `•` decoded as Windows-1252. Some datasets were
/// written through a bad transcoding step and carry this instead.
const MISDECODED_BULLET: &str = "â€¢";

/// Render an answer line by line: blank lines become breaks, bulleted lines
/// become bullet points, and everything else is a plain answer line.
pub fn format_answer(answer: &str) -> Markup {
    let answer = answer.replace(MISDECODED_BULLET, BULLET);
    html! {
        @for line in answer.split('\n') {
            @let trimmed = line.trim();
            @if trimmed.is_empty() {
                br;
            } @else if trimmed.starts_with(BULLET) {
                div.bullet-point { (trimmed) }
            } @else {
                div.answer-line { (line) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let html = format_answer("Paris").into_string();
        assert_eq!(html, "<div class=\"answer-line\">Paris</div>");
    }

    #[test]
    fn test_blank_lines_and_bullets() {
        let html = format_answer("Mars\n\n  • fourth planet\n• red").into_string();
        assert_eq!(
            html,
            "<div class=\"answer-line\">Mars</div><br>\
             <div class=\"bullet-point\">• fourth planet</div>\
             <div class=\"bullet-point\">• red</div>"
        );
    }

    #[test]
    fn test_misdecoded_bullet_is_a_bullet() {
        let html = format_answer("â€¢ fourth planet").into_string();
        assert_eq!(html, "<div class=\"bullet-point\">• fourth planet</div>");
    }

    #[test]
    fn test_escapes_markup() {
        let html = format_answer("<b>bold</b>").into_string();
        assert_eq!(
            html,
            "<div class=\"answer-line\">&lt;b&gt;bold&lt;/b&gt;</div>"
        );
    }
}
